//! The worker loop: newline-delimited JSON requests on stdin, one response
//! per request on stdout.
//!
//! Each request is a single synchronous, non-preemptible parse. There is no
//! cancellation: the caller debounces keystroke-driven reparses and discards
//! stale responses by correlating the echoed request id. Any failure answers
//! with the empty graph — empty, never partial — so one bad request cannot
//! take the process down.

use std::io::{BufRead, Write};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::flow::edge::FlowEdge;
use crate::flow::node::FlowNode;
use crate::parser::{ParseOptions, source_to_flow_or_empty};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseRequest {
    pub source_text: String,
    pub request_id: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    pub request_id: u64,
}

/// Serve requests from stdin until EOF.
pub fn run(options: &ParseOptions) -> Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(stdin.lock(), stdout.lock(), options)
}

/// The loop itself, generic over the streams for testability.
///
/// Lines that are not valid requests are reported on stderr and skipped —
/// they carry no request id to answer under.
pub fn serve<R: BufRead, W: Write>(reader: R, mut writer: W, options: &ParseOptions) -> Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let request: ParseRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                eprintln!("warning: ignoring malformed request: {err}");
                continue;
            }
        };

        let graph = source_to_flow_or_empty(&request.source_text, options);
        let response = ParseResponse {
            nodes: graph.nodes,
            edges: graph.edges,
            request_id: request.request_id,
        };
        serde_json::to_writer(&mut writer, &response)?;
        writeln!(writer)?;
        writer.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(input: &str) -> Vec<serde_json::Value> {
        let mut output = Vec::new();
        serve(input.as_bytes(), &mut output, &ParseOptions::default()).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_request_id_is_echoed() {
        let responses = roundtrip("{\"sourceText\": \"const x = 1;\", \"requestId\": 7}\n");
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["requestId"], 7);
        assert!(!responses[0]["nodes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_syntax_error_answers_with_the_empty_graph() {
        let responses = roundtrip("{\"sourceText\": \"function broken( {\", \"requestId\": 3}\n");
        assert_eq!(responses[0]["requestId"], 3);
        assert!(responses[0]["nodes"].as_array().unwrap().is_empty());
        assert!(responses[0]["edges"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_request_lines_are_skipped() {
        let input = "not json\n{\"sourceText\": \"const a = 1;\", \"requestId\": 1}\n";
        let responses = roundtrip(input);
        assert_eq!(responses.len(), 1, "only the valid request is answered");
        assert_eq!(responses[0]["requestId"], 1);
    }

    #[test]
    fn test_requests_are_independent() {
        let input = "{\"sourceText\": \"const a = 1;\", \"requestId\": 1}\n\
                     {\"sourceText\": \"const a = 1;\", \"requestId\": 2}\n";
        let responses = roundtrip(input);
        assert_eq!(responses.len(), 2);
        assert_eq!(
            responses[0]["nodes"], responses[1]["nodes"],
            "fresh context per request: identical input, identical graph"
        );
    }
}
