//! Editor server.
//!
//! A lightweight HTTP server built on `tiny_http`:
//!
//! - `GET /` renders the edit form, `POST /` saves it
//! - `POST /sync` downloads the repository snapshot
//! - `GET /reload` flashes a confirmation
//! - `GET /cataclysms/<file>` serves images from the local mirror
//! - Graceful shutdown on Ctrl+C
//!
//! Requests are handled one at a time on the main thread, so two
//! read-modify-write cycles on the data file never overlap. Every POST
//! answers with a `303` redirect back to `/`; the message to show travels
//! in a short-lived `flash` cookie.

use crate::{
    codec::cataclysm::ASSETS_ROUTE,
    config::EditorConfig,
    editor::{Editor, FormData, SaveOutcome, Submission},
    log,
    sync::{SyncError, SyncReport},
};
use anyhow::{Context, Result, anyhow};
use std::{
    borrow::Cow,
    fs,
    io::{Cursor, Read},
    net::{IpAddr, SocketAddr},
    path::{Component, Path},
    sync::Arc,
};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

type HttpResponse = Response<Cursor<Vec<u8>>>;

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

/// Largest accepted form body.
const MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

/// Cookie carrying the message shown on the next page render.
const FLASH_COOKIE: &str = "flash";

const SAVED_MESSAGE: &str = "Изменения сохранены ✅";
const STALE_MESSAGE: &str = "Файл изменился после загрузки формы, изменения не сохранены ⚠️";
const RELOAD_MESSAGE: &str = "Перезагрузка интерфейса выполнена 🔄";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the editor server.
///
/// Binds to the configured interface and port (with auto-retry on port
/// conflict), installs the Ctrl+C handler and handles requests until
/// shutdown.
pub fn serve_editor(config: &EditorConfig) -> Result<()> {
    let interface: IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "editing {}", config.data.path.display());
    log!("serve"; "http://{}", addr);

    let editor = Editor::new(config);
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &editor) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;
    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Handle a single HTTP request.
///
/// A failing route never stops the server: the error is logged and
/// answered with `500` and its text.
fn handle_request(mut request: Request, editor: &Editor) -> Result<()> {
    let response = match route(&mut request, editor) {
        Ok(response) => response,
        Err(err) => {
            log!("error"; "{} {}: {err:#}", request.method(), request.url());
            text_response(500, &format!("{err:#}"))?
        }
    };
    request.respond(response)?;
    Ok(())
}

fn route(request: &mut Request, editor: &Editor) -> Result<HttpResponse> {
    // Decode URL-encoded characters (e.g., %20 → space)
    let url_path = urlencoding::decode(request.url())
        .map(Cow::into_owned)
        .unwrap_or_default();
    // Strip query string before matching
    let path = url_path.split('?').next().unwrap_or(&url_path);
    let method = request.method().clone();

    match (&method, path) {
        (Method::Get, "/") => index(request, editor),
        (Method::Post, "/") => save(request, editor),
        (Method::Post, "/sync") => sync(request, editor),
        (Method::Get, "/reload") => redirect(Some(RELOAD_MESSAGE)),
        (Method::Get, asset) if asset.starts_with(ASSETS_ROUTE) => {
            serve_asset(&editor.config().data.assets, &asset[ASSETS_ROUTE.len()..])
        }
        _ => text_response(404, "404 Not Found"),
    }
}

fn index(request: &Request, editor: &Editor) -> Result<HttpResponse> {
    let flash = read_flash(request);
    let html = editor.page(flash.as_deref())?;

    let mut response = Response::from_string(html)
        .with_header(header("Content-Type", "text/html; charset=utf-8")?);
    if flash.is_some() {
        response.add_header(header("Set-Cookie", &clear_flash_cookie())?);
    }
    Ok(response)
}

fn save(request: &mut Request, editor: &Editor) -> Result<HttpResponse> {
    let form = match read_form(request)? {
        Some(form) => form,
        None => return text_response(413, "413 Payload Too Large"),
    };

    let message = match editor.save(&Submission::from_form(&form))? {
        SaveOutcome::Saved { .. } => SAVED_MESSAGE,
        SaveOutcome::Stale => STALE_MESSAGE,
    };
    redirect(Some(message))
}

fn sync(request: &mut Request, editor: &Editor) -> Result<HttpResponse> {
    let form = match read_form(request)? {
        Some(form) => form,
        None => return text_response(413, "413 Payload Too Large"),
    };

    let message = sync_message(editor.sync(form.get("repo"), form.get("branch")));
    redirect(Some(&message))
}

/// Flash text for a sync run; failures are reported to the operator, not raised.
fn sync_message(result: Result<SyncReport, SyncError>) -> String {
    match result {
        Ok(report) => format!("Синхронизация завершена ✅ Обновлено файлов: {}", report.count()),
        Err(err) => {
            log!("error"; "sync failed: {err}");
            err.to_string()
        }
    }
}

/// Read and decode a form body; `None` when it exceeds [`MAX_BODY_BYTES`].
fn read_form(request: &mut Request) -> Result<Option<FormData>> {
    let mut body = Vec::new();
    request
        .as_reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut body)
        .context("Failed to read request body")?;

    if body.len() as u64 > MAX_BODY_BYTES {
        return Ok(None);
    }
    let form = FormData::parse(&body).context("Malformed form body")?;
    Ok(Some(form))
}

// ============================================================================
// Assets
// ============================================================================

/// Serve a file from the image mirror. Anything that leaves the mirror is a 404.
fn serve_asset(assets_dir: &Path, relative: &str) -> Result<HttpResponse> {
    let relative = Path::new(relative);
    let contained = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    let local_path = assets_dir.join(relative);

    if !contained || relative.as_os_str().is_empty() || !local_path.is_file() {
        return text_response(404, "404 Not Found");
    }

    let content = fs::read(&local_path)
        .with_context(|| format!("Failed to read {}", local_path.display()))?;
    Ok(Response::from_data(content)
        .with_header(header("Content-Type", guess_content_type(&local_path))?))
}

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("Invalid header `{name}: {value}`"))
}

fn text_response(status: u16, body: &str) -> Result<HttpResponse> {
    Ok(Response::from_string(body)
        .with_status_code(StatusCode(status))
        .with_header(header("Content-Type", "text/plain; charset=utf-8")?))
}

/// `303 See Other` back to the form, optionally carrying a flash message.
fn redirect(flash: Option<&str>) -> Result<HttpResponse> {
    let mut response = Response::from_data(Vec::new())
        .with_status_code(StatusCode(303))
        .with_header(header("Location", "/")?);
    if let Some(message) = flash {
        response.add_header(header("Set-Cookie", &flash_cookie(message))?);
    }
    Ok(response)
}

// ============================================================================
// Flash Cookie
// ============================================================================

fn flash_cookie(message: &str) -> String {
    format!(
        "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
        urlencoding::encode(message)
    )
}

fn clear_flash_cookie() -> String {
    format!("{FLASH_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Flash message from the request cookies, if any.
fn read_flash(request: &Request) -> Option<String> {
    request
        .headers()
        .iter()
        .filter(|h| h.field.equiv("Cookie"))
        .find_map(|h| flash_from_cookies(h.value.as_str()))
}

fn flash_from_cookies(cookies: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(Cow::into_owned)
        .filter(|message| !message.is_empty())
}
