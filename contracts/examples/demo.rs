//! Interactive CLI demo of the token-bound account lifecycle.
//!
//! Walks through factory creation, an atomic mint with value forwarding,
//! operation validation against live ownership, module installation, the
//! self-transfer lock, and the module reset that follows a real transfer.
//!
//! Run with:
//!   cargo run --example demo --release

use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;

use signet_contracts::account_deployer::DeployConfig;
use signet_contracts::account_factory::{AccountFactory, FeePolicy};
use signet_contracts::bound_account::{ModuleAction, ModuleId, ModuleRequest};
use signet_contracts::ownership_validator::Operation;
use signet_protocol::config::NETWORK_ID_DEVNET;
use signet_protocol::crypto::signatures::SignedAuthorization;
use signet_protocol::crypto::SignetKeypair;
use signet_protocol::identity::SignetAddress;

// ---------------------------------------------------------------------------
// ANSI color constants
// ---------------------------------------------------------------------------

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ---------------------------------------------------------------------------
// Display helpers
// ---------------------------------------------------------------------------

fn section(num: u32, title: &str) {
    println!();
    println!(
        "{BOLD}{CYAN}===[{YELLOW} Step {num} {CYAN}]=============================================================={RESET}"
    );
    println!("{BOLD}{WHITE}  {title}{RESET}");
    println!(
        "{CYAN}------------------------------------------------------------------------{RESET}"
    );
}

fn success(text: &str) {
    println!("{GREEN}  [OK] {text}{RESET}");
}

fn rejected(text: &str) {
    println!("{RED}  [REJECTED] {text}{RESET}");
}

fn info(label: &str, value: &str) {
    println!("{WHITE}  {BOLD}{label}:{RESET} {YELLOW}{value}{RESET}");
}

fn short(addr: &SignetAddress) -> String {
    let s = addr.to_bech32();
    format!("{}...{}", &s[..12], &s[s.len() - 6..])
}

// ---------------------------------------------------------------------------
// Demo
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    println!();
    println!("{BOLD}{WHITE}  SIGNET — token-bound modular accounts, end to end{RESET}");
    println!("{DIM}  one token, one account, one source of authority{RESET}");

    // -- Step 1: identities --------------------------------------------------
    section(1, "Identities");
    let alice = SignetKeypair::generate();
    let alice_addr = SignetAddress::from_public_key(&alice.public_key());
    let bob = SignetKeypair::generate();
    let bob_addr = SignetAddress::from_public_key(&bob.public_key());
    info("alice", &short(&alice_addr));
    info("bob", &short(&bob_addr));

    // -- Step 2: factory + mint ----------------------------------------------
    section(2, "Mint a controlling token and deploy its bound account");
    let factory_addr = SignetAddress::from_digest([0xF0; 32]);
    // The execution environment serializes operations per factory; the
    // lock models that here.
    let factory = Arc::new(RwLock::new(AccountFactory::new(
        factory_addr,
        NETWORK_ID_DEVNET,
        FeePolicy::Flat(100),
    )?));

    let receipt = factory
        .write()
        .mint(alice_addr, &DeployConfig::embedded(), 10_000)?;
    info("token id", &receipt.token_id.to_string());
    info("account", &short(&receipt.account));
    {
        let f = factory.read();
        info(
            "balance",
            &format!("{} grains (10000 - 100 fee)", f.account(&receipt.account).unwrap().balance()),
        );
        assert_eq!(f.account_address(receipt.token_id)?, receipt.account);
        success("registry lookup equals the deterministic derivation");
    }

    // -- Step 3: validate an operation ---------------------------------------
    section(3, "Validate an operation signed by the owner");
    let mut op = Operation {
        account: receipt.account,
        payload: b"transfer 500 grains to bob".to_vec(),
        nonce: 1,
        authorization: SignedAuthorization::sign(&alice, b""),
    };
    let op_hash = op.digest();
    op.authorization = SignedAuthorization::sign(&alice, &op_hash);

    let outcome = factory.read().validate_operation(&op, &op_hash)?;
    info("outcome", &outcome.to_string());
    success("current owner's signature authorizes the operation");

    // -- Step 4: install a module --------------------------------------------
    section(4, "Install a module (gated by the ownership validator)");
    let request = ModuleRequest {
        account: receipt.account,
        action: ModuleAction::Install(ModuleId::named("session-keys")),
        nonce: 1,
    };
    let auth = SignedAuthorization::sign(&alice, &request.digest());
    factory.write().apply_module_request(&request, &auth)?;
    info(
        "modules",
        &factory.read().account(&receipt.account).unwrap().modules().len().to_string(),
    );
    success("session-keys installed alongside the permanent validator");

    // -- Step 5: the self-transfer lock --------------------------------------
    section(5, "Attempt to send the token to its own account");
    match factory
        .write()
        .transfer_token(receipt.token_id, alice_addr, receipt.account)
    {
        Err(e) => rejected(&e.to_string()),
        Ok(_) => unreachable!("the self-transfer lock must hold"),
    }

    // -- Step 6: a real transfer, and the reset ------------------------------
    section(6, "Transfer the token to bob");
    let removed = factory
        .write()
        .transfer_token(receipt.token_id, alice_addr, bob_addr)?;
    info("modules removed", &removed.len().to_string());
    success("account collapsed to validator-only state");

    match factory.read().validate_operation(&op, &op_hash)? {
        outcome if !outcome.is_authorized() => {
            rejected(&format!("alice's pre-transfer signature: {outcome}"))
        }
        _ => unreachable!("stale owner must not validate"),
    }

    let mut bob_op = Operation {
        account: receipt.account,
        payload: op.payload.clone(),
        nonce: 2,
        authorization: SignedAuthorization::sign(&bob, b""),
    };
    let bob_hash = bob_op.digest();
    bob_op.authorization = SignedAuthorization::sign(&bob, &bob_hash);
    let outcome = factory.read().validate_operation(&bob_op, &bob_hash)?;
    info("re-signed by bob", &outcome.to_string());

    // -- Step 7: metadata + records ------------------------------------------
    section(7, "Metadata and the record log");
    let meta = factory.read().token_metadata(receipt.token_id)?;
    info("name", &meta.name);
    info("Account Address", meta.account_address().unwrap_or("-"));
    info("records emitted", &factory.read().events().len().to_string());

    println!();
    success("lifecycle complete");
    println!();
    Ok(())
}
