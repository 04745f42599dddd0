use structopt::StructOpt;

use crate::app::Config;
use crate::logging::Level;

#[macro_export]
macro_rules! main {
    (|$args:ident: $sopt:ty, $ctx:ident: Context| $body:block; default) => {
        fn main() {
            let $args = <$sopt>::from_args();
            let config = Config::default();
            App::from_config(config)
                .main(move |$ctx: Context| $body)
                .run();
        }
    };
    (|$args:ident: $sopt:ty, $ctx:ident: Context| $body:block; @$field:ident) => {
        fn main() {
            let $args = <$sopt>::from_args();
            App::from_config($args.$field.clone())
                .main(move |$ctx: Context| $body)
                .run();
        }
    };
    (|$args:ident: $sopt:ty, $ctx:ident: Context| $body:block) => {
        $crate::main!(|$args: $sopt, $ctx: Context| $body; @common);
    };
    (|$args:ident: $sopt:ty, $ctx:ident: Context| $body:expr) => {
        $crate::main!(|$args: $sopt, $ctx: Context| { $body });
    };
}

#[derive(StructOpt, Debug, Clone)]
pub struct CommonArgs {
    /// Activate debug mode
    #[structopt(short = "d", long = "debug")]
    pub debug: bool,

    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    pub verbose: u8,

    /// Directory to write a time-stamped log file into
    #[structopt(long = "logdir", value_name = "DIR")]
    pub logdir: Option<String>,
}

impl From<CommonArgs> for Config {
    fn from(args: CommonArgs) -> Config {
        let mut config = Config::default();
        config.logging.verbosity = match (args.debug, args.verbose) {
            (false, 0) => Level::Info,
            (true, 0) | (false, 1) => Level::Debug,
            _ => Level::Trace,
        };
        match args.logdir {
            Some(dir) => {
                config.logging.logdir = dir;
                config.logging.mkdir = true;
                config.logging.level = if args.debug { Level::Debug } else { Level::Info };
            }
            None => {
                config.logging.level = Level::Off;
            }
        }
        config
    }
}
