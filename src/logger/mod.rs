//! Logger module
//!
//! Provides logging utilities for the locator including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Component lookup tracing
//! - Error and warning logging

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::bom::PatchOutcome;
use crate::config::Config;
use std::net::SocketAddr;
use writer::Level;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn enabled(level: Level) -> bool {
    writer::get().map_or(level >= Level::Info, |w| w.enabled(level))
}

/// Write to info/access log
fn write_info(message: &str) {
    if !enabled(Level::Info) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_debug(message: &str) {
    if !enabled(Level::Debug) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(level: Level, message: &str) {
    if !enabled(level) {
        return;
    }
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(viewer: &SocketAddr, manager: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("BOM locator started");
    write_info(&format!("Viewer:  http://{viewer}"));
    write_info(&format!("Manager: http://{manager}"));
    write_info(&format!("BOM page: {}", config.bom.file));
    write_info(&format!("Components: {}", config.catalog.components_file));
    write_info(&format!("Serial baud rate: {}", config.serial.baud_rate));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_table_loaded(count: usize, path: &std::path::Path) {
    write_info(&format!(
        "[Catalog] Loaded {count} components from {}",
        path.display()
    ));
}

pub fn log_reload_triggered() {
    write_info("\n[Reload] SIGHUP received, reloading component table");
}

pub fn log_signals_registered(pid: u32) {
    write_info(&format!(
        "[Signal] PID {pid}: SIGHUP reloads components, SIGTERM/SIGINT stop the server"
    ));
}

pub fn log_shutdown(signal: &str) {
    write_info(&format!("\n[Shutdown] {signal} received, stopping listeners"));
}

pub fn log_listener_stopped(surface: &str) {
    write_info(&format!("[Shutdown] {surface} listener stopped"));
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_debug(&format!("[DEBUG] [Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(Level::Error, &format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_connection_limit(max: usize) {
    write_error(
        Level::Warn,
        &format!("[WARN] Connection limit ({max}) reached, dropping connection"),
    );
}

pub fn log_error(message: &str) {
    write_error(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_api_error(message: &str) {
    write_error(Level::Error, &format!("[API ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(Level::Warn, &format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_api_request(method: &str, path: &str, status: u16) {
    write_info(&format!("[API] {method} {path} - {status}"));
}

pub fn log_lightup_request(part_number: &str, parameter: &str, footprint: &str) {
    write_info(&format!(
        "[Lookup] part_number={part_number:?} parameter={parameter:?} footprint={footprint:?}"
    ));
}

pub fn log_exact_match(part_number: &str) {
    write_info(&format!("[Lookup] Exact match: {part_number}"));
}

pub fn log_fuzzy_search(part_number: Option<&str>, parameter: Option<&str>, footprint: Option<&str>) {
    write_info(&format!(
        "[Lookup] No exact match, fuzzy search (part_number={}, parameter={}, footprint={})",
        part_number.unwrap_or("-"),
        parameter.unwrap_or("-"),
        footprint.unwrap_or("-"),
    ));
}

pub fn log_normalized(field: &str, raw: &str, normalized: &str) {
    write_info(&format!("[Lookup] {field} normalized: {raw} -> {normalized}"));
}

pub fn log_best_match(part_number: &str, score: u32, reasons: &str, candidates: usize) {
    write_info(&format!(
        "[Lookup] Best match: {part_number} (score {score}, {candidates} candidates): {reasons}"
    ));
}

pub fn log_runner_up(part_number: &str, score: u32, reasons: &str) {
    write_info(&format!("[Lookup]   runner-up: {part_number} (score {score}): {reasons}"));
}

pub fn log_not_found() {
    write_info("[Lookup] No matching component");
}

pub fn log_location(part_number: &str, box_id: i64, led_id: i64) {
    write_info(&format!("[Lookup] {part_number} -> box {box_id}, LED {led_id}"));
}

pub fn log_patch_outcome(outcome: PatchOutcome) {
    match outcome {
        PatchOutcome::Applied => write_info("[BOM] console.log patch applied"),
        PatchOutcome::SnippetMissing => {
            log_warning("BOM console.log snippet not found, page served unpatched");
        }
        PatchOutcome::Disabled => write_info("[BOM] console.log patch disabled"),
    }
}
