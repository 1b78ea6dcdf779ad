/*
 * SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */

/* iLO out-of-band administration client
 *
 * USAGE: ./hpe-oob-client -H ilo-h1,ilo-h2 -U admin -P secret smtp-secure get
 *        ./hpe-oob-client -H ilo-h1 -U admin smtp-secure set --state enabled --send-test
 *        ./hpe-oob-client -H ilo-h1 -U admin drives
 * Run with `-v` for more output.
 */

use std::time::Duration;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use hpe_oob::{
    AuthMethod, BatchDriver, CertPolicy, ConnectOptions, Credential, DriveInventoryAction,
    EnabledDisabled, RedfishClientPool, SessionManager, SmtpSecureAction, VersionGate,
};
use tracing::{error, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(version, about = "Query and configure HPE iLO managers over Redfish")]
struct Args {
    /// Hostname or IP address of an iLO. Repeat or comma separate for several.
    #[arg(short = 'H', long = "host", value_delimiter = ',', required = true)]
    hosts: Vec<String>,

    /// iLO username
    #[arg(short = 'U', long)]
    username: String,

    /// iLO password
    #[arg(short = 'P', long, env = "HPE_OOB_PASSWORD", hide_env_values = true)]
    password: String,

    /// Accept self signed and otherwise invalid TLS certificates
    #[arg(long)]
    skip_cert_check: bool,

    /// Use HTTP basic auth instead of a Redfish session
    #[arg(long)]
    basic_auth: bool,

    /// Per request timeout
    #[arg(long, default_value_t = 20)]
    timeout_secs: u64,

    /// Only operate on iLO 5 firmware at or above this revision, e.g. 2.10
    #[arg(long)]
    min_revision: Option<String>,

    /// Print records as JSON
    #[arg(long)]
    json: bool,

    /// Log at DEBUG level. Default is INFO
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// AlertMail SMTP secure connection (STARTTLS) setting
    SmtpSecure {
        #[command(subcommand)]
        op: SmtpOp,
    },
    /// Physical drive inventory
    Drives,
}

#[derive(Subcommand, Debug)]
enum SmtpOp {
    Get,
    Set {
        #[arg(long, value_enum)]
        state: EnabledDisabled,
        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
        /// Send a test alert mail after the change
        #[arg(long)]
        send_test: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    let log_level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let env_filter = EnvFilter::from_default_env()
        .add_directive(log_level.into())
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("rustls=warn".parse()?);
    tracing_subscriber::registry()
        .with(Layer::default().compact())
        .with(env_filter)
        .init();

    let pool = RedfishClientPool::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()?;
    let options = ConnectOptions {
        cert_policy: if args.skip_cert_check {
            CertPolicy::AcceptInvalid
        } else {
            CertPolicy::Validate
        },
        auth_method: if args.basic_auth {
            AuthMethod::Basic
        } else {
            AuthMethod::Session
        },
        timeout: None,
    };
    let mut gate = VersionGate::default();
    if let Some(rev) = &args.min_revision {
        gate = gate.with_minimum_revision(rev.clone());
    }
    let driver = BatchDriver::new(SessionManager::new(pool, options), gate);
    let credential = Credential::new(args.username.clone(), args.password.clone());

    let failures = match &args.cmd {
        Command::SmtpSecure { op } => {
            let action = match op {
                SmtpOp::Get => SmtpSecureAction::Read,
                SmtpOp::Set {
                    state,
                    dry_run,
                    send_test,
                } => SmtpSecureAction::Set {
                    state: *state,
                    dry_run: *dry_run,
                    send_test: *send_test,
                },
            };
            let records = driver.run_hosts(&args.hosts, &credential, &action).await;
            for r in &records {
                if args.json {
                    println!("{}", serde_json::to_string(r)?);
                } else {
                    info!(
                        "{}: {} smtp_secure={} {}",
                        r.hostname,
                        r.outcome,
                        r.smtp_secure_enabled
                            .map(|s| s.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                        r.message_id.as_deref().unwrap_or_default()
                    );
                }
            }
            records.iter().filter(|r| r.outcome.is_failure()).count()
        }
        Command::Drives => {
            let records = driver
                .run_hosts(&args.hosts, &credential, &DriveInventoryAction)
                .await;
            for r in &records {
                if args.json {
                    println!("{}", serde_json::to_string(r)?);
                    continue;
                }
                if let Some((kind, msg)) = &r.error {
                    error!("{}: {kind}: {msg}", r.hostname);
                }
                for d in &r.drives {
                    info!(
                        "{} {}/{} {} {} {} bytes {:?}",
                        r.hostname,
                        d.storage_id,
                        d.drive_id,
                        d.model.as_deref().unwrap_or("-"),
                        d.serial_number.as_deref().unwrap_or("-"),
                        d.capacity_bytes.unwrap_or_default(),
                        d.health
                    );
                }
            }
            records.iter().filter(|r| r.error.is_some()).count()
        }
    };

    if failures > 0 {
        return Err(anyhow!("{failures} of {} hosts failed", args.hosts.len()));
    }
    Ok(())
}
