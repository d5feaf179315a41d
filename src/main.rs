// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus CLI entrypoint.
//!
//! Serves the agent command bridge over HTTP at `http://<host>:<port>/`,
//! default `127.0.0.1:9999`. `--demo` starts with a small seeded document
//! instead of an empty one.

use std::error::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 9999;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--host <addr>] [--port <port>] [--demo]\n\nServes the command bridge at `http://<host>:<port>/` (default {DEFAULT_HOST}:{DEFAULT_PORT}).\nSet RUST_LOG to control log verbosity.\n\n--demo seeds the document with a small example graph."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    host: Option<String>,
    port: Option<u16>,
    demo: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--host" => {
                if options.host.is_some() {
                    return Err(());
                }
                let host = args.next().ok_or(())?;
                options.host = Some(host);
            }
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.port = Some(port);
            }
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            _ => return Err(()),
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "proteus".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();

        let doc = if options.demo {
            proteus::doc::fixtures::demo_document()
        } else {
            proteus::doc::Document::new()
        };
        let doc_thread = proteus::uithread::DocThread::spawn(doc)?;

        let host = options.host.unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = options.port.unwrap_or(DEFAULT_PORT);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
            proteus::server::serve(listener, doc_thread).await
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("proteus: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_host_and_port() {
        let options = parse_options(
            ["--host".to_owned(), "0.0.0.0".to_owned(), "--port".to_owned(), "8123".to_owned()]
                .into_iter(),
        )
        .expect("parse options");
        assert_eq!(options.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(options.port, Some(8123));
        assert!(!options.demo);
    }

    #[test]
    fn parses_demo_flag() {
        let options = parse_options(["--demo".to_owned()].into_iter()).expect("parse options");
        assert!(options.demo);
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(["--nope".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(["--demo".to_owned(), "--demo".to_owned()].into_iter()).unwrap_err();
        parse_options(
            ["--port".to_owned(), "1".to_owned(), "--port".to_owned(), "2".to_owned()].into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_missing_values() {
        parse_options(["--host".to_owned()].into_iter()).unwrap_err();
        parse_options(["--port".to_owned()].into_iter()).unwrap_err();
        parse_options(["--port".to_owned(), "notaport".to_owned()].into_iter()).unwrap_err();
    }
}
