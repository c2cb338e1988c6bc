//! Exported C entry points.
//!
//! Nothing may unwind across these functions. Errors and ordinary panics are
//! turned into a [`ReturnValue`] with error byte 1; an [`AbortRequest`] panic
//! ends the process.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use anyhow::Result;
use gml_decompiler::AbortRequest;

use crate::bytecode::Code;
use crate::error::FfiError;
use crate::game_context::GameContext;
use crate::primitives::{OutputString, ReturnValue};
use crate::settings::Settings;

/// Exit status used when an abort request terminates the process.
pub const FATAL_EXIT_STATUS: i32 = 70;

/// Decompiles `code` against `game` into GML source text.
pub fn decompile_code(
    game: &GameContext<'_>,
    code: &Code<'_>,
    settings: &Settings,
) -> Result<String> {
    log::debug!(
        "decompile {:?}: {} instruction(s), {} child entr(ies), runtime {}.{}.{}.{}",
        code.name,
        code.instructions.len(),
        code.children.len(),
        game.version.major,
        game.version.minor,
        game.version.release,
        game.version.build
    );
    gml_decompiler::decompile_to_string(game, code, settings)
}

#[derive(Debug, PartialEq, Eq)]
enum Failure {
    Recoverable(String),
    Fatal(String),
}

/// Where the last panic on this thread was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PanicSite {
    location: String,
    backtrace: Option<String>,
}

thread_local! {
    static LAST_PANIC_SITE: RefCell<Option<PanicSite>> = const { RefCell::new(None) };
}

static INSTALL_PANIC_HOOK: Once = Once::new();

/// Chains a hook in front of the current one that records the panic location
/// (and a backtrace when `RUST_BACKTRACE` enables one) for [`guarded`].
fn install_panic_hook() {
    INSTALL_PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|location| location.to_string())
                .unwrap_or_else(|| "an unknown location".to_string());
            let trace = Backtrace::capture();
            let backtrace = match trace.status() {
                BacktraceStatus::Captured => Some(trace.to_string()),
                _ => None,
            };
            let _ = LAST_PANIC_SITE.try_with(|slot| {
                if let Ok(mut slot) = slot.try_borrow_mut() {
                    *slot = Some(PanicSite { location, backtrace });
                }
            });
            previous(info);
        }));
    });
}

fn take_panic_site() -> Option<PanicSite> {
    LAST_PANIC_SITE
        .try_with(|slot| slot.try_borrow_mut().ok().and_then(|mut slot| slot.take()))
        .ok()
        .flatten()
}

fn classify_panic(payload: Box<dyn Any + Send>, site: Option<PanicSite>) -> Failure {
    if let Some(abort) = payload.downcast_ref::<AbortRequest>() {
        return Failure::Fatal(abort.reason.clone());
    }
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    match site {
        None => Failure::Recoverable(format!("panicked: {}", message)),
        Some(PanicSite { location, backtrace: None }) => {
            Failure::Recoverable(format!("panicked at {}: {}", location, message))
        }
        Some(PanicSite { location, backtrace: Some(trace) }) => Failure::Recoverable(format!(
            "panicked at {}: {}\n\nstack backtrace:\n{}",
            location, message, trace
        )),
    }
}

fn fatal(reason: &str) -> ! {
    log::error!("abort requested: {}", reason);
    eprintln!("fatal: abort requested during decompilation: {}", reason);
    std::process::exit(FATAL_EXIT_STATUS)
}

fn guarded(call: impl FnOnce() -> Result<String>) -> ReturnValue {
    install_panic_hook();
    take_panic_site();
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(text)) => ReturnValue::ok(text),
        Ok(Err(err)) => {
            log::warn!("decompilation failed: {:#}", err);
            ReturnValue::failed(format!("{:?}", err))
        }
        Err(payload) => match classify_panic(payload, take_panic_site()) {
            Failure::Recoverable(message) => {
                log::warn!("decompilation {}", message);
                ReturnValue::failed(message)
            }
            Failure::Fatal(reason) => fatal(&reason),
        },
    }
}

/// # Safety
/// Both pointers must be null or point to host-owned data matching the
/// `#[repr(C)]` layouts, valid and unmodified for the whole call. The
/// returned buffer must be released exactly once with [`free_output`].
#[no_mangle]
pub unsafe extern "C" fn decompile_to_string(
    game_context: *const GameContext<'_>,
    code: *const Code<'_>,
) -> ReturnValue {
    guarded(|| {
        let game = game_context
            .as_ref()
            .ok_or(FfiError::NullInput("game_context"))?;
        let code = code.as_ref().ok_or(FfiError::NullInput("code"))?;
        decompile_code(game, code, &Settings::default())
    })
}

/// Releases a buffer returned by [`decompile_to_string`]. Null is ignored.
///
/// # Safety
/// `ptr` must come from a [`ReturnValue`] produced by this library and must
/// not have been released before.
#[no_mangle]
pub unsafe extern "C" fn free_output(ptr: *mut c_char) {
    OutputString::release(ptr);
}

#[cfg(test)]
mod tests {
    use std::process::Command;

    use super::*;

    const ABORT_CHILD_ENV: &str = "GML_FFI_ABORT_CHILD";

    fn site(location: &str) -> Option<PanicSite> {
        Some(PanicSite {
            location: location.to_string(),
            backtrace: None,
        })
    }

    #[test]
    fn abort_requests_are_fatal() {
        let payload: Box<dyn Any + Send> = Box::new(AbortRequest::new("runtime state lost"));
        assert_eq!(
            classify_panic(payload, site("src/decompile.rs:10:5")),
            Failure::Fatal("runtime state lost".to_string())
        );
    }

    #[test]
    fn other_panics_are_recoverable() {
        assert_eq!(
            classify_panic(Box::new("boom"), None),
            Failure::Recoverable("panicked: boom".to_string())
        );
        assert_eq!(
            classify_panic(Box::new(format!("bad {}", 3)), site("src/expr.rs:4:9")),
            Failure::Recoverable("panicked at src/expr.rs:4:9: bad 3".to_string())
        );
        assert_eq!(
            classify_panic(Box::new(42u32), None),
            Failure::Recoverable("panicked: non-string panic payload".to_string())
        );
    }

    #[test]
    fn recovered_panics_carry_a_backtrace_when_captured() {
        let site = Some(PanicSite {
            location: "src/expr.rs:4:9".to_string(),
            backtrace: Some("   0: gml_decompiler::expr::render".to_string()),
        });
        let Failure::Recoverable(text) = classify_panic(Box::new("boom"), site) else {
            panic!("expected a recoverable failure");
        };
        assert!(text.starts_with("panicked at src/expr.rs:4:9: boom"), "{text}");
        assert!(text.contains("stack backtrace:\n   0: gml_decompiler::expr::render"), "{text}");
    }

    #[test]
    fn guarded_calls_never_unwind() {
        let value = guarded(|| panic!("index went wild"));
        assert_eq!(value.error, 1);
        let text = unsafe { value.into_result() }.unwrap_err().to_string();
        assert!(text.contains("index went wild"), "{text}");
        assert!(text.contains("exports.rs:"), "{text}");

        let value = guarded(|| Err(FfiError::NotImplemented("script_id").into()));
        let text = unsafe { value.into_result() }.unwrap_err().to_string();
        assert!(text.contains("script_id is not implemented"), "{text}");
    }

    #[test]
    fn panic_sites_do_not_leak_between_calls() {
        let value = guarded(|| panic!("first"));
        assert_eq!(value.error, 1);
        unsafe { free_output(value.string.ptr) };
        assert_eq!(take_panic_site(), None);

        let value = guarded(|| Ok("fine".to_string()));
        assert_eq!(unsafe { value.into_result() }.unwrap(), "fine");
    }

    #[test]
    fn null_inputs_are_recoverable() {
        let value = unsafe { decompile_to_string(std::ptr::null(), std::ptr::null()) };
        assert_eq!(value.error, 1);
        let text = unsafe { value.into_result() }.unwrap_err().to_string();
        assert!(text.contains("game_context"), "{text}");
    }

    /// Runs only inside the child process spawned by
    /// `abort_requests_end_the_process`.
    #[test]
    fn abort_request_child_process() {
        if std::env::var_os(ABORT_CHILD_ENV).is_none() {
            return;
        }
        guarded(|| panic::panic_any(AbortRequest::new("runtime state lost")));
        unreachable!("an abort request must end the process");
    }

    #[test]
    fn abort_requests_end_the_process() {
        let output = Command::new(std::env::current_exe().unwrap())
            .args([
                "exports::tests::abort_request_child_process",
                "--exact",
                "--nocapture",
                "--test-threads=1",
            ])
            .env(ABORT_CHILD_ENV, "1")
            .output()
            .unwrap();
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(output.status.code(), Some(FATAL_EXIT_STATUS), "{stderr}");
        assert!(
            stderr.contains("fatal: abort requested during decompilation: runtime state lost"),
            "{stderr}"
        );
    }
}
