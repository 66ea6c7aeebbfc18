use crate::errors::KubeError;
use crate::kube::LogStream;
use futures_util::StreamExt;
use regex::Regex;
use std::sync::LazyLock;

static USING_NAMESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Using namespace .*/(ci-op-[a-z0-9]{8})").expect("namespace pattern is valid")
});

/// Finds the `ci-op-*` namespace ci-operator announces in its log output.
pub fn namespace_from_logs(logs: &str) -> Option<&str> {
    USING_NAMESPACE
        .captures(logs)
        .and_then(|captures| captures.get(1))
        .map(|namespace| namespace.as_str())
}

fn namespace_in_line(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    namespace_from_logs(&line).map(str::to_string)
}

/// Scans a log stream line by line and stops reading at the first match.
pub async fn scan_for_namespace(mut stream: LogStream) -> Result<Option<String>, KubeError> {
    let mut pending: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        // bytes before `scanned` hold no newline
        let mut scanned = pending.len();
        let mut line_start = 0;
        pending.extend_from_slice(&chunk?);

        while let Some(offset) = pending[scanned..].iter().position(|byte| *byte == b'\n') {
            let newline = scanned + offset;
            if let Some(namespace) = namespace_in_line(&pending[line_start..newline]) {
                return Ok(Some(namespace));
            }
            line_start = newline + 1;
            scanned = line_start;
        }
        pending.drain(..line_start);
    }

    Ok(namespace_in_line(&pending))
}
