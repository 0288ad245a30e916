use std::sync::Mutex;

pub type TestResult<T = ()> = color_eyre::eyre::Result<T>;

static INSTALLED: Mutex<bool> = Mutex::new(false);
/// Installs the error report handler and a log subscriber filtered by `RUST_LOG`, once per
/// process.
pub(super) fn install() {
    let mut lock = INSTALLED.lock().unwrap_or_else(|e| e.into_inner());
    if !*lock {
        let _ = color_eyre::install();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
        *lock = true;
    }
}

macro_rules! ensure_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                ::color_eyre::eyre::ensure!((left_val == right_val), r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`"#, left_val, right_val);
            }
        }
    };
    ($left:expr, $right:expr, $($arg:tt)+) => {
        match (&$left, &$right) {
            (left_val, right_val) => {
                ::color_eyre::eyre::ensure!((left_val == right_val), r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`: {}"#, left_val, right_val, ::core::format_args!($($arg)+));
            }
        }
    };
}
