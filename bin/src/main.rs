use lumen::{
    clamp_percent, CtrlMode, Field, LumenBuilder, LumenError, OpMode, Request, Target, ValueMode,
};

use clap::{ArgGroup, CommandFactory, Parser};
use log::LevelFilter;
use std::process::ExitCode;

/// Get and set the brightness of backlight controllers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(
            ArgGroup::new("operation")
                .args(["get", "set", "add", "sub", "list", "save", "restore"]),
        ))]
#[command(group(ArgGroup::new("target").args(["backlight", "keyboard"])))]
#[command(group(ArgGroup::new("field").args(["brightness", "max_brightness", "mincap"])))]
#[command(group(ArgGroup::new("selection").args(["auto", "controller", "all"])))]
#[command(group(ArgGroup::new("mode").args(["percent", "exponential", "raw"])))]
struct Args {
    /// Print the current value (default operation)
    #[arg(short = 'G', long)]
    get: bool,

    /// Set the value
    #[arg(short = 'S', long)]
    set: bool,

    /// Add to the value
    #[arg(short = 'A', long)]
    add: bool,

    /// Subtract from the value
    #[arg(short = 'U', long)]
    sub: bool,

    /// List the available controllers
    #[arg(short = 'L', long)]
    list: bool,

    /// Save the current brightness
    #[arg(short = 'O', long)]
    save: bool,

    /// Restore the saved brightness
    #[arg(short = 'I', long)]
    restore: bool,

    /// Act on the screen backlight (default target)
    #[arg(short = 'l', long)]
    backlight: bool,

    /// Act on the keyboard backlight
    #[arg(short = 'k', long)]
    keyboard: bool,

    /// Operate on the brightness (default field, used with -G -S -A -U)
    #[arg(short = 'b', long)]
    brightness: bool,

    /// Operate on the maximum brightness (used with -G)
    #[arg(short = 'm', long)]
    max_brightness: bool,

    /// Operate on the minimum cap (used with -G -S)
    #[arg(short = 'c', long)]
    mincap: bool,

    /// Select the controller automatically (default selection)
    #[arg(short = 'a', long)]
    auto: bool,

    /// Use the specified controller
    #[arg(short = 's', long, value_name = "controller")]
    controller: Option<String>,

    /// Run the operation on every available controller
    #[arg(long)]
    all: bool,

    /// Interpret and print values as a linear percentage (default mode)
    #[arg(short = 'p', long)]
    percent: bool,

    /// Interpret and print values as an exponential percentage
    #[arg(short = 'e', long)]
    exponential: bool,

    /// Interpret and print values in raw hardware units
    #[arg(short = 'r', long)]
    raw: bool,

    /// Verbosity: 0 values only, 1 errors, 2 warnings, 3 notices
    #[arg(short = 'v', long, value_name = "level", default_value_t = 0)]
    verbosity: u8,

    /// Value for set, add and subtract
    #[arg(value_name = "VALUE")]
    value: Option<String>,
}

impl Args {
    fn op(&self) -> OpMode {
        if self.set {
            OpMode::Set
        } else if self.add {
            OpMode::Add
        } else if self.sub {
            OpMode::Sub
        } else if self.save {
            OpMode::Save
        } else if self.restore {
            OpMode::Restore
        } else {
            OpMode::Get
        }
    }

    fn field(&self) -> Field {
        if self.max_brightness {
            Field::MaxBrightness
        } else if self.mincap {
            Field::MinCap
        } else {
            Field::Brightness
        }
    }

    fn target(&self) -> Target {
        if self.keyboard {
            Target::Keyboard
        } else {
            Target::Backlight
        }
    }

    fn ctrl_mode(&self) -> CtrlMode {
        if let Some(name) = &self.controller {
            CtrlMode::Specify(name.clone())
        } else if self.all {
            CtrlMode::All
        } else {
            CtrlMode::Auto
        }
    }

    fn mode(&self) -> ValueMode {
        if self.raw {
            ValueMode::Raw
        } else if self.exponential {
            ValueMode::PercentExponential
        } else {
            ValueMode::Percent
        }
    }
}

/// Reject field/operation pairs up front, before any file is touched.
fn check_ops(field: Field, op: OpMode) -> Result<(), LumenError> {
    let valid = match field {
        Field::Brightness => true,
        Field::MaxBrightness => op == OpMode::Get,
        Field::MinCap => matches!(op, OpMode::Get | OpMode::Set),
        Field::SaveRestore => op == OpMode::Get,
    };
    if valid {
        Ok(())
    } else {
        Err(LumenError::InvalidOperation(format!(
            "operation {op:?} cannot be used with field {field:?}"
        )))
    }
}

/// Parse the positional value: a float percentage clamped to 0-100 for
/// the percent modes, a bare integer for raw mode.
fn parse_value(value: Option<&str>, mode: ValueMode) -> Result<u64, LumenError> {
    let Some(value) = value else {
        return Err(LumenError::InvalidOperation(
            "need an argument for <value>".to_string(),
        ));
    };
    match mode {
        ValueMode::Raw => value.parse().map_err(|_| {
            LumenError::InvalidOperation(format!(
                "value '{value}' is not a raw brightness value"
            ))
        }),
        _ => {
            let pct: f64 = value.parse().map_err(|_| {
                LumenError::InvalidOperation(format!("value '{value}' is not a percentage"))
            })?;
            Ok((clamp_percent(pct) * 100.0).round() as u64)
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn usage() {
    let _ = Args::command().print_help();
}

async fn run(args: &Args) -> Result<(), LumenError> {
    let op = args.op();
    let field = args.field();
    check_ops(field, op)?;

    let lumen = LumenBuilder::new()
        .with_target(args.target())
        .with_controller_mode(args.ctrl_mode())
        .build()
        .await?;

    if args.list {
        for name in lumen.list_controllers().await? {
            println!("{name}");
        }
        return Ok(());
    }

    let value = match op {
        OpMode::Set | OpMode::Add | OpMode::Sub => parse_value(args.value.as_deref(), args.mode())?,
        _ => 0,
    };

    let request = Request::new(field, op, args.mode(), value);
    lumen.run(&request).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbosity > 3 {
        eprintln!("-v verbosity has to be between 0 and 3\n");
        usage();
        return ExitCode::FAILURE;
    }
    init_logging(args.verbosity);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            if matches!(e, LumenError::InvalidOperation(_)) {
                eprintln!();
                usage();
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_cannot_be_combined() {
        assert!(Args::try_parse_from(["lumen_cli", "-G", "-S"]).is_err());
        assert!(Args::try_parse_from(["lumen_cli", "--set", "--add"]).is_err());
    }

    #[test]
    fn value_modes_cannot_be_combined() {
        assert!(Args::try_parse_from(["lumen_cli", "-p", "-r"]).is_err());
    }

    #[test]
    fn defaults_are_get_brightness_percent_auto() {
        let args = Args::try_parse_from(["lumen_cli"]).unwrap();
        assert_eq!(args.op(), OpMode::Get);
        assert_eq!(args.field(), Field::Brightness);
        assert_eq!(args.target(), Target::Backlight);
        assert_eq!(args.ctrl_mode(), CtrlMode::Auto);
        assert_eq!(args.mode(), ValueMode::Percent);
    }

    #[test]
    fn set_takes_a_positional_value() {
        let args = Args::try_parse_from(["lumen_cli", "-S", "50"]).unwrap();
        assert_eq!(args.op(), OpMode::Set);
        assert_eq!(args.value.as_deref(), Some("50"));
    }

    #[test]
    fn get_on_max_brightness_is_allowed_but_set_is_not() {
        assert!(check_ops(Field::MaxBrightness, OpMode::Get).is_ok());
        assert!(check_ops(Field::MaxBrightness, OpMode::Set).is_err());
        assert!(check_ops(Field::MinCap, OpMode::Add).is_err());
    }

    #[test]
    fn percent_values_are_clamped_and_scaled_to_hundredths() {
        assert_eq!(parse_value(Some("50"), ValueMode::Percent).unwrap(), 5000);
        assert_eq!(parse_value(Some("10.5"), ValueMode::Percent).unwrap(), 1050);
        assert_eq!(parse_value(Some("150"), ValueMode::Percent).unwrap(), 10000);
        assert_eq!(parse_value(Some("-3"), ValueMode::Percent).unwrap(), 0);
    }

    #[test]
    fn raw_values_parse_as_integers() {
        assert_eq!(parse_value(Some("123"), ValueMode::Raw).unwrap(), 123);
        assert!(parse_value(Some("12.5"), ValueMode::Raw).is_err());
        assert!(parse_value(None, ValueMode::Raw).is_err());
    }
}
