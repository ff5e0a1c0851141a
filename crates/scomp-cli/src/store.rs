//! # CLI State Store
//!
//! One JSON file holds the whole toolchain state: the local ledger
//! (coprocessor, registry, block clock) and a keystore mapping account
//! names to signing seeds. Seeds are stored as plaintext hex, which
//! makes the file a development keystore, not a wallet.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use scomp_core::{AccountAddress, ContractAddress};
use scomp_fhe::AccountKeys;
use scomp_runtime::LocalLedger;

/// Serialized CLI state: the ledger plus named account seeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliStore {
    /// The local ledger every subcommand transacts against.
    pub ledger: LocalLedger,
    /// Account name to 32-byte signing seed, hex encoded.
    pub accounts: BTreeMap<String, String>,
}

impl CliStore {
    /// Fresh store with a registry deployed under `label`.
    pub fn init(registry_label: &str) -> Self {
        Self {
            ledger: LocalLedger::new(ContractAddress::from_label(registry_label)),
            accounts: BTreeMap::new(),
        }
    }

    /// Load the store from a JSON state file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read state file: {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("state file is not valid JSON: {}", path.display()))
    }

    /// Write the store back to its JSON state file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self).context("failed to serialize state")?;
        std::fs::write(path, raw)
            .with_context(|| format!("failed to write state file: {}", path.display()))
    }

    /// Generate a seed and register it under `name`. Returns the
    /// derived account address.
    pub fn add_account(&mut self, name: &str) -> Result<AccountAddress> {
        if name.is_empty() {
            bail!("account name must not be empty");
        }
        if self.accounts.contains_key(name) {
            bail!("account '{name}' already exists");
        }
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        let keys = AccountKeys::from_seed(&seed);
        self.accounts.insert(name.to_string(), encode_seed(&seed));
        Ok(keys.address())
    }

    /// Signing keys for a named account.
    pub fn keys_for(&self, name: &str) -> Result<AccountKeys> {
        let seed_hex = self
            .accounts
            .get(name)
            .with_context(|| format!("unknown account: '{name}'"))?;
        let seed =
            decode_seed(seed_hex).with_context(|| format!("corrupt seed for account '{name}'"))?;
        Ok(AccountKeys::from_seed(&seed))
    }

    /// Resolve an account argument: a keystore name, else a
    /// `0x`-prefixed address.
    pub fn resolve_account(&self, who: &str) -> Result<AccountAddress> {
        if self.accounts.contains_key(who) {
            return Ok(self.keys_for(who)?.address());
        }
        AccountAddress::parse(who)
            .with_context(|| format!("'{who}' is neither a known account name nor an address"))
    }
}

/// Hex-encode a signing seed for storage.
fn encode_seed(seed: &[u8; 32]) -> String {
    seed.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a stored seed. Errors on length or non-hex characters.
fn decode_seed(hex: &str) -> Result<[u8; 32]> {
    if hex.len() != 64 {
        bail!("seed must be 64 hex characters, got {}", hex.len());
    }
    let mut seed = [0u8; 32];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk).context("seed is not valid UTF-8")?;
        seed[i] = u8::from_str_radix(pair, 16)
            .with_context(|| format!("seed byte {i} is not hex: '{pair}'"))?;
    }
    Ok(seed)
}

/// Arguments for `scomp init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Deployment label the registry contract address is derived from.
    #[arg(long, default_value = "compliance-registry")]
    pub registry_label: String,

    /// Overwrite an existing state file.
    #[arg(long)]
    pub force: bool,
}

/// Execute `scomp init`.
pub fn run_init(args: &InitArgs, state_path: &Path) -> Result<u8> {
    if state_path.exists() && !args.force {
        bail!(
            "state file already exists: {} (pass --force to overwrite)",
            state_path.display()
        );
    }
    let store = CliStore::init(&args.registry_label);
    store.save(state_path)?;
    println!("OK: initialized ledger state at {}", state_path.display());
    println!("  registry: {}", store.ledger.registry().address());
    println!("  block: {}", store.ledger.block_number());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_creates_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let args = InitArgs {
            registry_label: "test-registry".to_string(),
            force: false,
        };

        let code = run_init(&args, &path).unwrap();
        assert_eq!(code, 0);
        assert!(path.exists());

        let store = CliStore::load(&path).unwrap();
        assert_eq!(store.ledger.block_number(), 0);
        assert!(store.accounts.is_empty());
        assert_eq!(
            store.ledger.registry().address(),
            ContractAddress::from_label("test-registry")
        );
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let args = InitArgs {
            registry_label: "test-registry".to_string(),
            force: false,
        };

        run_init(&args, &path).unwrap();
        let err = run_init(&args, &path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn init_with_force_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        run_init(
            &InitArgs {
                registry_label: "first".to_string(),
                force: false,
            },
            &path,
        )
        .unwrap();

        let code = run_init(
            &InitArgs {
                registry_label: "second".to_string(),
                force: true,
            },
            &path,
        )
        .unwrap();
        assert_eq!(code, 0);

        let store = CliStore::load(&path).unwrap();
        assert_eq!(
            store.ledger.registry().address(),
            ContractAddress::from_label("second")
        );
    }

    #[test]
    fn add_account_persists_across_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut store = CliStore::init("test-registry");
        let address = store.add_account("auditor").unwrap();
        store.save(&path).unwrap();

        let reloaded = CliStore::load(&path).unwrap();
        assert_eq!(reloaded.keys_for("auditor").unwrap().address(), address);
    }

    #[test]
    fn add_account_rejects_duplicate_name() {
        let mut store = CliStore::init("test-registry");
        store.add_account("auditor").unwrap();

        let err = store.add_account("auditor").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn add_account_rejects_empty_name() {
        let mut store = CliStore::init("test-registry");
        assert!(store.add_account("").is_err());
    }

    #[test]
    fn keys_for_unknown_account_errors() {
        let store = CliStore::init("test-registry");
        let err = store.keys_for("nobody").unwrap_err();
        assert!(err.to_string().contains("unknown account"));
    }

    #[test]
    fn resolve_account_accepts_name_or_address() {
        let mut store = CliStore::init("test-registry");
        let named = store.add_account("auditor").unwrap();

        assert_eq!(store.resolve_account("auditor").unwrap(), named);

        let literal = format!("{named}");
        assert_eq!(store.resolve_account(&literal).unwrap(), named);

        assert!(store.resolve_account("not-a-name-or-address").is_err());
    }

    #[test]
    fn seed_hex_round_trips() {
        let mut seed = [0u8; 32];
        for (i, byte) in seed.iter_mut().enumerate() {
            *byte = i as u8;
        }
        let hex = encode_seed(&seed);
        assert_eq!(hex.len(), 64);
        assert_eq!(decode_seed(&hex).unwrap(), seed);
    }

    #[test]
    fn decode_seed_rejects_bad_input() {
        assert!(decode_seed("abcd").is_err());
        assert!(decode_seed(&"zz".repeat(32)).is_err());
    }
}
