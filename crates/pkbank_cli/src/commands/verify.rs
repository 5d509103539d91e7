//! Verify command implementation.

use super::Context;
use pkbank_core::backup;
use pkbank_core::format::BankImage;
use pkbank_core::layout::{BackendKind, LEGACY_BANK_NAME, LEGACY_BANK_PATH};
use pkbank_core::{digest, BankPaths, BoxNames, CoreError};
use pkbank_storage::StorageBackend;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of files checked.
    pub files_checked: usize,
    /// Findings that do not prevent loading.
    pub warnings: Vec<String>,
    /// Findings that lose data or prevent loading.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(ctx: &Context, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let paths = BankPaths::new(name)?;
    let backends = ctx.backends();
    println!("Verifying bank {name:?}");
    println!();

    let mut result = VerifyResult::default();
    let mut primary = None;

    for kind in BackendKind::ALL {
        let backend = backends.get(kind);
        if !backend.exists(paths.bank()) {
            continue;
        }
        if let Some(image) = verify_bank(backend, &paths, kind, &mut result) {
            if primary.is_some() {
                result
                    .warnings
                    .push(format!("bank also present on {kind}; it will be moved or replaced"));
            } else {
                primary = Some(image);
            }
        }
    }

    if name == LEGACY_BANK_NAME && backends.get(BackendKind::Removable).exists(LEGACY_BANK_PATH) {
        result
            .warnings
            .push("legacy bank present; it will be converted on next load".to_string());
    }

    let removable = backends.get(BackendKind::Removable);
    if backup::has_backup(removable, &paths) {
        result.files_checked += 1;
        match backup::read_backup(removable, &paths) {
            Ok(snapshot) => {
                let current = primary
                    .as_ref()
                    .is_some_and(|image| digest(image.as_bytes()) == digest(snapshot.image.as_bytes()));
                if !current {
                    result.warnings.push("backup differs from the bank".to_string());
                }
            }
            Err(e) => result.errors.push(format!("backup unreadable: {e}")),
        }
    } else {
        result.warnings.push("no backup found".to_string());
    }

    if primary.is_none() && result.errors.is_empty() {
        result.warnings.push("no bank file found; a new one will be created".to_string());
    }

    print_result(&result);
    println!();
    if result.is_ok() {
        println!("✓ Bank verification passed");
        Ok(())
    } else {
        println!("✗ Bank verification failed");
        Err("Verification failed".into())
    }
}

fn verify_bank(
    backend: &dyn StorageBackend,
    paths: &BankPaths,
    kind: BackendKind,
    result: &mut VerifyResult,
) -> Option<BankImage> {
    result.files_checked += 1;
    let bytes = match backend.read(paths.bank()) {
        Ok(bytes) => bytes,
        Err(e) => {
            result.errors.push(format!("{kind}: cannot read bank: {e}"));
            return None;
        }
    };

    let parsed = match BankImage::parse(bytes) {
        Ok(parsed) => parsed,
        Err(e @ CoreError::UnsupportedVersion { .. }) => {
            result.errors.push(format!("{kind}: {e}; the bank cannot be opened"));
            return None;
        }
        Err(e) => {
            result
                .errors
                .push(format!("{kind}: {e}; the bank would be replaced by an empty one"));
            return None;
        }
    };
    if parsed.needs_save {
        result
            .warnings
            .push(format!("{kind}: bank will be upgraded or trimmed on next load"));
    }

    let boxes = parsed.image.boxes();
    result.files_checked += 1;
    match backend.read(paths.names()) {
        Ok(data) => match BoxNames::from_json(&data) {
            Ok(names) if names.len() < boxes as usize => result.warnings.push(format!(
                "{kind}: {} box names for {boxes} boxes; defaults will be added",
                names.len()
            )),
            Ok(_) => {}
            Err(e) => result
                .warnings
                .push(format!("{kind}: box names unreadable ({e}); defaults will be used")),
        },
        Err(_) => result
            .warnings
            .push(format!("{kind}: box names missing; defaults will be used")),
    }

    Some(parsed.image)
}

fn print_result(result: &VerifyResult) {
    println!("  Files checked: {}", result.files_checked);
    for warning in &result.warnings {
        println!("  warning: {warning}");
    }
    for error in &result.errors {
        println!("  error:   {error}");
    }
}
