use std::io::Read;

use crate::browser::session::BrowserSession;
use crate::cli::config::AppConfig;
use crate::designer::retry::{RetryPolicy, retry_until};
use crate::designer::run_test::find_run_test_button;
use crate::designer::title::TitleTracker;
use crate::scan::cache::SnapshotCache;
use crate::scan::field_model::Snapshot;
use crate::sync::codec::snapshot_to_json;
use crate::sync::writeback::sync_json_to_inputs;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

// ============================================================================
// Shared session plumbing
// ============================================================================

/// Launch the sidecar, open the test-step page and let it settle.
fn attach(config: &AppConfig, script_override: Option<&str>, url: &str) -> Result<BrowserSession, Box<dyn std::error::Error>> {
    let script = script_override.unwrap_or(&config.browser.server_script);
    let mut session = BrowserSession::launch(script)?;
    session.navigate(url)?;
    session.wait_idle(config.browser.settle_ms)?;
    Ok(session)
}

fn tracer(config: &AppConfig) -> TraceLogger {
    match &config.trace.path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    }
}

/// Scan until the grid shows up. The host renders its input rows late, so
/// the first scans after navigation routinely come back empty.
fn scan_with_retry(
    cache: &mut SnapshotCache,
    session: &mut BrowserSession,
) -> Result<Option<Snapshot>, Box<dyn std::error::Error>> {
    let found = retry_until(RetryPolicy::default(), || {
        let snapshot = cache.snapshot(session, true)?;
        Ok(if snapshot.is_empty() { None } else { Some(snapshot) })
    })?;
    Ok(found)
}

// ============================================================================
// export subcommand
// ============================================================================

pub fn cmd_export(
    url: &str,
    output: Option<&str>,
    config: &AppConfig,
    script_override: Option<&str>,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let logger = tracer(config);
    let mut session = attach(config, script_override, url)?;
    let mut cache = SnapshotCache::new();

    if verbose > 0 {
        eprintln!("Scanning inputs on {}...", url);
    }

    let snapshot = scan_with_retry(&mut cache, &mut session)?;
    session.quit()?;

    let Some(snapshot) = snapshot else {
        eprintln!("No inputs found on this page. Make sure you are on the test step.");
        println!("{{}}");
        return Ok(());
    };

    logger.log(&TraceEvent::scan(&snapshot));

    let document = serde_json::to_string_pretty(&snapshot_to_json(&snapshot))?;
    match output {
        Some(path) => std::fs::write(path, &document)?,
        None => println!("{}", document),
    }

    if verbose > 0 {
        eprintln!("Found {} input(s), fingerprint {}", snapshot.len(), snapshot.fingerprint);
        let mandatory = snapshot.mandatory_keys();
        if !mandatory.is_empty() {
            eprintln!("Mandatory fields ({}): {}", mandatory.len(), mandatory.join(", "));
        }
        for skip in &snapshot.skipped {
            eprintln!("Skipped '{}': {:?}", skip.key, skip.reason);
        }
    }

    Ok(())
}

// ============================================================================
// sync subcommand
// ============================================================================

/// Sync a JSON document into the page. Returns whether the batch succeeded.
pub fn cmd_sync(
    url: &str,
    json_path: &str,
    config: &AppConfig,
    script_override: Option<&str>,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let json_text = if json_path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(json_path)?
    };

    let logger = tracer(config);
    let mut session = attach(config, script_override, url)?;
    let mut cache = SnapshotCache::new();

    // Give the grid a chance to render before the sync's own forced scan.
    let _ = scan_with_retry(&mut cache, &mut session)?;

    if verbose > 0 {
        eprintln!("Syncing inputs on {}...", url);
    }

    let report = sync_json_to_inputs(&json_text, &mut cache, &mut session);
    session.quit()?;

    logger.log(&TraceEvent::sync(&report));

    if report.success {
        println!("{}", report.message);
        for warning in &report.errors {
            eprintln!("Warning: {}", warning);
        }
    } else {
        eprintln!("Sync failed:");
        for error in &report.errors {
            eprintln!("  - {}", error);
        }
    }

    Ok(report.success)
}

// ============================================================================
// run-test subcommand
// ============================================================================

pub fn cmd_run_test(
    url: &str,
    config: &AppConfig,
    script_override: Option<&str>,
    verbose: u8,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut session = attach(config, script_override, url)?;

    let button = retry_until(RetryPolicy::default(), || {
        let (_title, dom) = session.extract()?;
        Ok(find_run_test_button(&dom))
    })?;

    let triggered = match button {
        Some(handle) => {
            session.click(handle)?;
            println!("Run Test triggered");
            true
        }
        None => {
            eprintln!("Run Test button not found (or disabled) on {}", url);
            false
        }
    };

    if verbose > 0 && triggered {
        eprintln!("Clicked Run Test on {}", url);
    }

    session.quit()?;
    Ok(triggered)
}

// ============================================================================
// watch subcommand
// ============================================================================

/// Poll the page and mirror the method name into the tab title.
pub fn cmd_watch(
    url: &str,
    interval_ms: u64,
    max_polls: u64,
    config: &AppConfig,
    script_override: Option<&str>,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = attach(config, script_override, url)?;
    let mut tracker = TitleTracker::new();

    let mut polls: u64 = 0;
    loop {
        let (_title, dom) = session.extract()?;
        if let Some(name) = tracker.refresh(&dom, &mut session)? {
            if verbose > 0 {
                eprintln!("Title updated: {}", name);
            }
        }

        polls += 1;
        if max_polls > 0 && polls >= max_polls {
            break;
        }
        std::thread::sleep(std::time::Duration::from_millis(interval_ms));
    }

    session.quit()?;
    Ok(())
}
