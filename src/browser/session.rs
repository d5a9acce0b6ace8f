use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::browser::dom::DomTree;
use crate::designer::error::DesignerError;
use crate::scan::cache::DomSource;
use crate::sync::sink::{ControlEvent, ControlHandle, ControlSink};

/// Request sent to designer_server.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Extract {
        cmd: &'static str,
    },
    SetValue {
        cmd: &'static str,
        handle: u64,
        value: String,
    },
    Dispatch {
        cmd: &'static str,
        handle: u64,
        event: &'static str,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        rich: bool,
    },
    Click {
        cmd: &'static str,
        handle: u64,
    },
    SetTitle {
        cmd: &'static str,
        title: String,
    },
    Wait {
        cmd: &'static str,
        duration_ms: u64,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn extract() -> Self {
        BrowserRequest::Extract { cmd: "extract" }
    }

    pub fn set_value(handle: ControlHandle, value: &str) -> Self {
        BrowserRequest::SetValue {
            cmd: "set_value",
            handle: handle.0,
            value: value.to_string(),
        }
    }

    pub fn dispatch(handle: ControlHandle, event: ControlEvent) -> Self {
        let (name, rich) = event.wire_form();
        BrowserRequest::Dispatch {
            cmd: "dispatch",
            handle: handle.0,
            event: name,
            rich,
        }
    }

    pub fn click(handle: ControlHandle) -> Self {
        BrowserRequest::Click {
            cmd: "click",
            handle: handle.0,
        }
    }

    pub fn set_title(title: &str) -> Self {
        BrowserRequest::SetTitle {
            cmd: "set_title",
            title: title.to_string(),
        }
    }

    pub fn wait(duration_ms: u64) -> Self {
        BrowserRequest::Wait {
            cmd: "wait",
            duration_ms,
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response received from designer_server.js over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Extraction payload: `{ "title": ..., "url": ..., "dom": { ...tree } }`
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// A persistent browser session backed by designer_server.js.
///
/// Launches a long-lived Node.js process that keeps a Chromium tab on the
/// Service Designer page. Commands are sent as NDJSON over stdin, responses
/// read from stdout.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    current_url: Option<String>,
}

impl BrowserSession {
    /// Launch a new session by spawning the sidecar script.
    pub fn launch(script: &str) -> Result<Self, DesignerError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DesignerError::SubprocessSpawn {
                script: script.to_string(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            DesignerError::SessionIO("Failed to capture stdin of designer_server.js".into())
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DesignerError::SessionIO("Failed to capture stdout of designer_server.js".into())
        })?;

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| DesignerError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| DesignerError::JsonParse {
                context: "designer_server.js ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(DesignerError::SessionProtocol {
                command: "launch".into(),
                error: "Did not receive ready signal from designer_server.js".into(),
            });
        }

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            current_url: None,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, DesignerError> {
        let json = serde_json::to_string(request).map_err(|e| DesignerError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            DesignerError::SessionIO(format!("Failed to write to designer_server.js stdin: {}", e))
        })?;

        self.stdin.flush().map_err(|e| {
            DesignerError::SessionIO(format!("Failed to flush designer_server.js stdin: {}", e))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            DesignerError::SessionIO(format!(
                "Failed to read from designer_server.js stdout: {}",
                e
            ))
        })?;

        if line.trim().is_empty() {
            return Err(DesignerError::SessionIO(
                "Empty response from designer_server.js (process may have died)".into(),
            ));
        }

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| DesignerError::JsonParse {
                context: "designer_server.js response".into(),
                source: e,
            })?;

        Ok(response)
    }

    /// Send a request and verify it succeeded.
    fn send_ok(
        &mut self,
        request: &BrowserRequest,
        command_name: &str,
    ) -> Result<BrowserResponse, DesignerError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(DesignerError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Navigate to a URL.
    pub fn navigate(&mut self, url: &str) -> Result<(), DesignerError> {
        let request = BrowserRequest::navigate(url);
        self.send_ok(&request, "navigate")?;
        self.current_url = Some(url.to_string());
        Ok(())
    }

    /// Extract the current page. Returns the document title and the DOM tree.
    pub fn extract(&mut self) -> Result<(String, DomTree), DesignerError> {
        let request = BrowserRequest::extract();
        let response = self.send_ok(&request, "extract")?;
        let data = response.data.ok_or_else(|| DesignerError::SessionProtocol {
            command: "extract".into(),
            error: "No data in extract response".into(),
        })?;

        let title = data["title"].as_str().unwrap_or("").to_string();
        let dom = data.get("dom").cloned().ok_or_else(|| {
            DesignerError::DomStructure("extract response has no 'dom' tree".into())
        })?;

        Ok((title, DomTree::from_value(dom)?))
    }

    /// Click an element by remote handle.
    pub fn click(&mut self, handle: ControlHandle) -> Result<(), DesignerError> {
        let request = BrowserRequest::click(handle);
        self.send_ok(&request, "click")?;
        Ok(())
    }

    /// Rewrite the document title.
    pub fn set_title(&mut self, title: &str) -> Result<(), DesignerError> {
        let request = BrowserRequest::set_title(title);
        self.send_ok(&request, "set_title")?;
        Ok(())
    }

    /// Let the page settle.
    pub fn wait_idle(&mut self, ms: u64) -> Result<(), DesignerError> {
        let request = BrowserRequest::wait(ms);
        self.send_ok(&request, "wait")?;
        Ok(())
    }

    /// Last navigated URL (cached, no browser call).
    pub fn last_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Quit the browser session.
    pub fn quit(&mut self) -> Result<(), DesignerError> {
        let request = BrowserRequest::quit();
        // Best-effort quit; don't fail hard if the process is already gone
        let _ = self.send(&request);
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Best-effort cleanup
        let _ = self.quit();
    }
}

impl DomSource for BrowserSession {
    fn extract_dom(&mut self) -> Result<DomTree, DesignerError> {
        let (_title, dom) = self.extract()?;
        Ok(dom)
    }
}

impl ControlSink for BrowserSession {
    fn set_value(&mut self, handle: ControlHandle, value: &str) -> Result<(), DesignerError> {
        let request = BrowserRequest::set_value(handle, value);
        self.send_ok(&request, "set_value")?;
        Ok(())
    }

    fn dispatch(&mut self, handle: ControlHandle, event: ControlEvent) -> Result<(), DesignerError> {
        let request = BrowserRequest::dispatch(handle, event);
        self.send_ok(&request, "dispatch")?;
        Ok(())
    }

    fn pause(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}
