//! # AAS Delegate CLI
//!
//! Command-line helpers for wiring a delegated Operation to the bridge.

use aas_delegate_adapter_aas::{
    decode_id_base64url, encode_id_base64url, encode_idshort_path, PropertyTarget,
};
use anyhow::{Context, Result};
use std::env;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "encode" => {
            let [id] = operands::<1>(&args, "encode <identifier>")?;
            println!("{}", encode_id_base64url(id));
        }
        "decode" => {
            let [encoded] = operands::<1>(&args, "decode <encoded>")?;
            let decoded = decode_id_base64url(encoded).context("Failed to decode")?;
            println!("{decoded}");
        }
        "target" => {
            let [repo, submodel_id, path] =
                operands::<3>(&args, "target <repo-url> <submodel-id> <idShortPath>")?;
            let target =
                PropertyTarget::new(repo, submodel_id, path).context("Failed to build target")?;
            println!("{target}");
        }
        "invoke-hint" => {
            let [repo, submodel_id, operation] =
                operands::<3>(&args, "invoke-hint <repo-url> <submodel-id> <operation-idShort>")?;
            println!("{}", invoke_hint(repo, submodel_id, operation));
        }
        "help" | "--help" | "-h" => {
            print_help();
        }
        cmd => {
            eprintln!("Unknown command: {cmd}");
            print_help();
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Exactly `N` operands after the command name.
fn operands<'a, const N: usize>(args: &'a [String], usage: &str) -> Result<[&'a str; N]> {
    let rest: Vec<&str> = args.iter().skip(2).map(String::as_str).collect();
    rest.try_into()
        .map_err(|_| anyhow::anyhow!("Usage: aas-delegate {usage}"))
}

/// `curl` command invoking a delegated Operation through the repository.
fn invoke_hint(repo: &str, submodel_id: &str, operation: &str) -> String {
    format!(
        "curl -s -X POST -H 'Content-Type: application/json' -d '[]' '{}/submodels/{}/submodel-elements/{}/invoke'",
        repo.trim_end_matches('/'),
        encode_id_base64url(submodel_id),
        encode_idshort_path(operation)
    )
}

fn print_help() {
    println!(
        r#"AAS Delegate CLI

USAGE:
    aas-delegate <COMMAND> [OPTIONS]

COMMANDS:
    encode <id>                                   Encode an AAS identifier to base64url (no padding)
    decode <encoded>                              Decode a base64url-encoded identifier
    target <repo-url> <submodel-id> <path>        Print the $value URL the bridge writes to
    invoke-hint <repo-url> <submodel-id> <op>     Print a curl command invoking the Operation
    help                                          Show this help message

EXAMPLES:
    aas-delegate encode "urn:example:sm:ops:1"
    aas-delegate target http://localhost:8081 "urn:example:sm:ops:1" pumpValue
    aas-delegate invoke-hint http://localhost:8081 "urn:example:sm:ops:1" hello
"#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn operands_exact_count() {
        let argv = args(&["aas-delegate", "encode", "urn:x"]);
        let [id] = operands::<1>(&argv, "encode <identifier>").unwrap();
        assert_eq!(id, "urn:x");

        let err = operands::<2>(&argv, "x <a> <b>").unwrap_err();
        assert_eq!(err.to_string(), "Usage: aas-delegate x <a> <b>");
    }

    #[test]
    fn hint_targets_invoke_endpoint() {
        let hint = invoke_hint("http://localhost:8081/", "urn:example:sm:ops:1", "hello");
        assert!(hint.ends_with(
            "'http://localhost:8081/submodels/dXJuOmV4YW1wbGU6c206b3BzOjE/submodel-elements/hello/invoke'"
        ));
    }
}
