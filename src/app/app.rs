use std::env;
use std::error::Error;
use std::fmt;
use std::process;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use slog::Logger;

use crate::logging::{AppLogger, Config as LogConfig};

#[derive(Debug)]
struct AppError {
    code: i32,
    error: Box<dyn Error + Send + Sync>,
}

impl AppError {
    pub fn new<E>(code: i32, error: E) -> AppError
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        AppError {
            code: code,
            error: error.into(),
        }
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.error)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} (code: {})", self.error, self.code)
    }
}

/// Per-invocation values handed to the application entry point.
#[derive(Debug)]
pub struct Context {
    pub logger: Logger,
    pub accessid: String,
    pub accesstime: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub exit_on_finish: bool,
    pub logging: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            exit_on_finish: true,
            logging: LogConfig::default(),
        }
    }
}

type MainFn = Box<dyn FnMut(Context) -> Result<(), Box<dyn Error + Send + Sync>> + Send + 'static>;

pub struct App {
    config: Config,
    main_fn: Option<MainFn>,
    logger: Option<AppLogger>,
    context: Option<Context>,
}

impl App {
    pub fn new() -> Self {
        App::from_config(Config::default())
    }

    pub fn from_config<C: Into<Config>>(config: C) -> Self {
        App {
            config: config.into(),
            main_fn: None,
            logger: None,
            context: None,
        }
    }

    pub fn main<F>(mut self, f: F) -> Self
    where
        F: FnMut(Context) -> Result<(), Box<dyn Error + Send + Sync>> + Send + 'static,
    {
        self.main_fn = Some(Box::new(f));
        self
    }

    pub fn run(mut self) {
        let mut code = App::initialize(&mut self);
        if code.is_ok() {
            code = App::exec(&mut self);
        }
        App::finalize(&mut self); // `finalize` must not fail.
        if self.config.exit_on_finish {
            let retcode = code.unwrap_or_else(|c| c);
            process::exit(retcode);
        }
    }

    #[inline]
    fn initialize(&mut self) -> Result<i32, i32> {
        if self.main_fn.is_none() {
            eprintln!("`main` must be called before running");
            return Err(1);
        }
        match AppLogger::new(self.config.logging.clone()) {
            // an async logger spawns threads internally.
            Ok(logger) => {
                let context = Context {
                    logger: logger.create(),
                    accessid: logger.accessid().to_string(),
                    accesstime: logger.accesstime().clone(),
                };
                self.logger = Some(logger);
                self.context = Some(context);
                Ok(0)
            }
            Err(e) => {
                eprintln!("{}", e);
                Err(1)
            }
        }
    }

    #[inline]
    fn exec(&mut self) -> Result<i32, i32> {
        self.preprocess();
        let (result, code) = match self.process() {
            Ok(_) => {
                let c = 0;
                (Ok(c), c)
            }
            Err(e) => {
                error!(self.logger.as_ref().unwrap(), "{}", e);
                let c = 128 + e.code();
                (Err(c), c)
            }
        };
        self.postprocess(code);
        result
    }

    #[inline]
    fn finalize(&mut self) {
        self.main_fn = None;
        self.logger = None;
        self.context = None;
        thread::sleep(Duration::from_millis(1));
    }

    #[inline]
    fn preprocess(&mut self) {
        let logger = self.logger.as_ref().unwrap();
        debug!(
            logger,
            "args: {}",
            env::args().collect::<Vec<String>>().join(" ")
        );
        debug!(logger, "{:?}", self.config);
        info!(logger, "*** [START] ***");
    }

    #[inline]
    fn process(&mut self) -> Result<(), AppError> {
        let mut main_fn = self.main_fn.take().unwrap();
        let context = self.context.take().unwrap();
        (*main_fn)(context).map_err(|e| AppError::new(1, e))
    }

    #[inline]
    fn postprocess(&mut self, code: i32) {
        let logger = self.logger.as_ref().unwrap();
        info!(logger, "application finished (code: {})", code);
        info!(logger, "*** [DONE] ***");
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("App").field("config", &self.config).finish()
    }
}
