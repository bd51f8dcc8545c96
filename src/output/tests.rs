//! Unit tests for the output module.

use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter as _;
use crate::output::reporter::TerminalReporter;
use crate::output::{OutputContext, Styles, progress};

#[test]
fn default_styles_produce_plain_text() {
    let styles = Styles::default();
    let styled = format!("{}", "test".style(styles.success));
    assert_eq!(styled, "test");
}

#[test]
fn colorize_applies_distinct_ansi_styles() {
    let mut styles = Styles::default();
    styles.colorize();
    let success = format!("{}", "x".style(styles.success));
    let warning = format!("{}", "x".style(styles.warning));
    let error = format!("{}", "x".style(styles.error));
    assert!(success.contains("\x1b["), "colorize should add ANSI codes");
    assert_ne!(success, warning);
    assert_ne!(warning, error);
}

#[test]
fn no_color_flag_disables_colors() {
    let ctx = OutputContext::new(true, false);
    let styled = format!("{}", "test".style(ctx.styles.success));
    assert!(!styled.contains("\x1b["));
}

#[test]
fn quiet_disables_progress_indicators() {
    let ctx = OutputContext::new(false, true);
    assert!(!ctx.show_progress());
}

#[test]
fn helper_methods_do_not_panic_in_either_mode() {
    for quiet in [false, true] {
        let ctx = OutputContext::new(true, quiet);
        ctx.success("instances started");
        ctx.info("uploading artifact");
        // error() is never suppressed - must not panic even when quiet
        ctx.error("connection refused");
    }
}

#[test]
fn reporter_does_not_panic_in_either_mode() {
    for quiet in [false, true] {
        let ctx = OutputContext::new(true, quiet);
        let reporter = TerminalReporter::new(&ctx);
        reporter.step("polling i-0abc123");
        reporter.success("started i-0abc123");
        reporter.warn("instance i-0abc123 entered state 'terminated'");
    }
}

#[test]
fn bar_length_matches_input() {
    let pb = progress::bar(100, "uploading artifact");
    assert_eq!(pb.length(), Some(100));
    pb.finish();
}

#[test]
fn finish_helpers_complete_the_bar() {
    let pb = progress::bar(8, "uploading artifact");
    progress::finish_success(&pb, "uploaded 8 bytes");
    assert!(pb.is_finished());

    let pb = progress::bar(8, "uploading artifact");
    progress::finish_error(&pb, "upload failed");
    assert!(pb.is_finished());
}
