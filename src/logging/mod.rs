use std::error;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io as std_io;
use std::ops::Deref;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::process;

use chrono::prelude::*;
pub use slog::FilterLevel as Level;
use slog::{
    Discard, Drain, Duplicate, Fuse, Level as LogLevel, LevelFilter, Logger, OwnedKV,
    SendSyncRefUnwindSafeKV,
};
use slog_async::Async;
use slog_term::{CompactFormat, Decorator, FullFormat, PlainDecorator, TermDecorator};
use uuid::Uuid;

use crate::utils;

#[derive(Debug)]
pub enum Stream {
    StdOut,
    StdErr,
    File(File),
    Null,
}

impl Stream {
    pub fn is_null(&self) -> bool {
        match *self {
            Stream::Null => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Format {
    Full,
    Compact,
}

#[derive(Debug)]
pub struct LoggerBuilder {
    stream: Stream,
    level: Level,
    format: Format,
}

impl LoggerBuilder {
    pub fn new(stream: Stream) -> Self {
        LoggerBuilder {
            stream: stream,
            level: Level::Debug,
            format: Format::Full,
        }
    }

    pub fn level(mut self, l: Level) -> Self {
        self.level = l;
        self
    }

    pub fn format(mut self, f: Format) -> Self {
        self.format = f;
        self
    }

    pub fn build<T>(self, values: OwnedKV<T>) -> Logger
    where
        T: SendSyncRefUnwindSafeKV + 'static,
    {
        match self.build_drain() {
            Some(drain) => Logger::root(drain.fuse(), values),
            None => Logger::root(Discard, values),
        }
    }

    fn build_drain(&self) -> Option<LevelFilter<Fuse<Async>>> {
        if let Level::Off = self.level {
            return None;
        }
        match self.stream {
            Stream::StdOut => {
                let drain = self.build_drain_from_decorator(TermDecorator::new().stdout().build());
                Some(drain)
            }
            Stream::StdErr => {
                let drain = self.build_drain_from_decorator(TermDecorator::new().stderr().build());
                Some(drain)
            }
            Stream::File(ref f) => {
                let drain =
                    self.build_drain_from_decorator(PlainDecorator::new(f.try_clone().unwrap()));
                Some(drain)
            }
            Stream::Null => None,
        }
    }

    fn build_drain_from_decorator<D: Decorator + Send + 'static>(
        &self,
        decorator: D,
    ) -> LevelFilter<Fuse<Async>> {
        let drain = match self.format {
            Format::Compact => {
                let drain = CompactFormat::new(decorator).use_local_timestamp().build();
                Async::new(drain.fuse()).build()
            }
            Format::Full => {
                let drain = FullFormat::new(decorator).use_local_timestamp().build();
                Async::new(drain.fuse()).build()
            }
        };
        LevelFilter::new(
            drain.fuse(),
            LogLevel::from_usize(self.level.as_usize()).unwrap_or(LogLevel::Trace),
        )
    }

    pub fn build_with<T>(self, other: LoggerBuilder, values: OwnedKV<T>) -> Logger
    where
        T: SendSyncRefUnwindSafeKV + 'static,
    {
        match (self.build_drain(), other.build_drain()) {
            (Some(d1), Some(d2)) => Logger::root(Duplicate::new(d1, d2).fuse(), values),
            (Some(d1), None) => Logger::root(d1.fuse(), values),
            (None, Some(d2)) => Logger::root(d2.fuse(), values),
            (None, None) => Logger::root(Discard, values),
        }
    }
}

#[derive(Debug)]
pub enum Error {
    InvalidOption,
    Other(std_io::Error),
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::InvalidOption => None,
            Error::Other(ref e) => Some(e),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::InvalidOption => "invalid option".fmt(f),
            Error::Other(ref err) => err.fmt(f),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub level: Level,
    pub verbosity: Level,
    pub logdir: String,
    pub mkdir: bool,
    pub filename: String,
    pub filemode: char,
    pub fileprefix: Option<String>,
    pub filesuffix: Option<String>,
    pub format: Format,
    pub use_stderr: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            level: Level::Debug,
            verbosity: Level::Trace,
            logdir: "./".to_string(),
            mkdir: false,
            filename: "%Y%m%d.log".to_string(),
            filemode: 'a',
            fileprefix: None,
            filesuffix: None,
            format: Format::Full,
            use_stderr: false,
        }
    }
}

pub fn create_logger<C: Into<Config>>(config: C) -> Result<Logger, Error> {
    create_logger_with_kv_and_time(config, o!(), Local::now())
}

pub fn create_logger_with_kv<C: Into<Config>, T>(
    config: C,
    values: OwnedKV<T>,
) -> Result<Logger, Error>
where
    T: SendSyncRefUnwindSafeKV + 'static,
{
    create_logger_with_kv_and_time(config, values, Local::now())
}

pub fn create_logger_with_kv_and_time<C: Into<Config>, T, Tz: TimeZone>(
    config: C,
    values: OwnedKV<T>,
    datetime: DateTime<Tz>,
) -> Result<Logger, Error>
where
    T: SendSyncRefUnwindSafeKV + 'static,
    Tz::Offset: fmt::Display,
{
    let c = config.into();
    let fstream = match c.level {
        Level::Off => Stream::Null,
        _ => {
            let mut options = OpenOptions::new();
            options.create(true).write(true);
            let mut enable_numbering = false;
            match c.filemode {
                'w' => {
                    options.truncate(true);
                }
                'a' => {
                    options.append(true);
                }
                'n' => {
                    options.truncate(true);
                    enable_numbering = true;
                }
                _ => {
                    return Err(Error::InvalidOption);
                }
            }
            let path = resolve_filepath(
                &c.logdir,
                &c.filename,
                c.fileprefix.as_ref().map(|s| s.as_str()),
                c.filesuffix.as_ref().map(|s| s.as_str()),
                datetime,
                c.mkdir,
                enable_numbering,
            )
            .map_err(Error::Other)?;
            let file = options.open(path).map_err(Error::Other)?;
            Stream::File(file)
        }
    };

    let vstream = if c.use_stderr {
        Stream::StdErr
    } else {
        Stream::StdOut
    };
    let logger = LoggerBuilder::new(vstream)
        .level(c.verbosity)
        .format(c.format)
        .build_with(
            LoggerBuilder::new(fstream).level(c.level).format(c.format),
            values,
        );
    Ok(logger)
}

fn resolve_filepath<P1: AsRef<Path>, P2: AsRef<Path>, Tz: TimeZone>(
    dir: P1,
    filename: P2,
    prefix: Option<&str>,
    suffix: Option<&str>,
    time: DateTime<Tz>,
    mkdir: bool,
    numbering: bool,
) -> Result<PathBuf, std_io::Error>
where
    Tz::Offset: fmt::Display,
{
    let dir = utils::path::expandtilde(dir);
    if dir.is_dir() {
        // pass
    } else if mkdir {
        fs::create_dir(&dir)?;
    } else {
        return Err(std_io::Error::new(
            std_io::ErrorKind::NotFound,
            format!("file `{}` is not a directory", dir.display()),
        ));
    }

    let filename = filename.as_ref();
    match filename.to_str() {
        Some(s) if !s.contains(MAIN_SEPARATOR) => {}
        _ => {
            return Err(std_io::Error::new(
                std_io::ErrorKind::InvalidInput,
                "filename must not contain the separator",
            ));
        }
    }

    let stem = filename
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| std_io::Error::new(std_io::ErrorKind::InvalidInput, "invalid filename"))?;
    let stem = format!(
        "{}{}{}",
        prefix.unwrap_or(""),
        time.format(stem),
        suffix.unwrap_or("")
    );
    let ext = filename
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| format!(".{}", s))
        .unwrap_or_else(|| "".to_string());

    if numbering {
        let mut number = 0;
        loop {
            let path = dir.join(format!("{}-{}{}", stem, number, ext));
            if !path.exists() {
                return Ok(path);
            }
            number += 1;
        }
    } else {
        Ok(dir.join(format!("{}{}", stem, ext)))
    }
}

static ACCESSTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A root logger wrapper that marks the lifetime of one invocation.
///
/// Every invocation gets a short access id derived from the start time
/// and the process id; matching `LOG Start` and `LOG End` records
/// bracket whatever the application logs in between.
pub struct AppLogger {
    logger: Logger,
    accessid: String,
    accesstime: DateTime<Local>,
}

impl AppLogger {
    pub fn new<C: Into<Config>>(config: C) -> Result<Self, Error> {
        let accesstime = Local::now();
        let accessid = generate_access_id(&accesstime);
        let logger = create_logger_with_kv_and_time(config, o!(), accesstime.clone())?;
        info!(
            logger,
            "LOG Start with ACCESSID=[{}] ACCESSTIME=[{}]",
            accessid,
            accesstime.format(ACCESSTIME_FORMAT)
        );
        Ok(AppLogger {
            logger: logger,
            accessid: accessid,
            accesstime: accesstime,
        })
    }

    /// A child logger carrying the access id of this invocation.
    pub fn create(&self) -> Logger {
        self.logger.new(o!("accessid" => self.accessid.clone()))
    }

    pub fn accessid(&self) -> &str {
        &self.accessid
    }

    pub fn accesstime(&self) -> &DateTime<Local> {
        &self.accesstime
    }
}

impl Deref for AppLogger {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.logger
    }
}

impl Drop for AppLogger {
    fn drop(&mut self) {
        let elapsed = Local::now().signed_duration_since(self.accesstime);
        info!(
            self.logger,
            "LOG End with ACCESSID=[{}] PROCESSTIME=[{}.{:03}]",
            self.accessid,
            elapsed.num_seconds(),
            (elapsed.num_milliseconds() % 1000).abs()
        );
    }
}

impl fmt::Debug for AppLogger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AppLogger")
            .field("accessid", &self.accessid)
            .field("accesstime", &self.accesstime)
            .finish()
    }
}

fn generate_access_id(time: &DateTime<Local>) -> String {
    let seed = format!("{}-{}", time.format("%Y%m%d%H%M%S%.9f"), process::id());
    let mut id = Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.as_bytes())
        .simple()
        .to_string();
    id.truncate(8);
    id
}
