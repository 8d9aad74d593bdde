//! Hardware Probe: is the panel's host board present?
//!
//! Read failures count as "absent". The answer is computed once per process.

use std::path::Path;
use std::sync::OnceLock;

const MODEL_PATH: &str = "/proc/device-tree/model";
const GPIOMEM_PATH: &str = "/dev/gpiomem";

static HARDWARE_PRESENT: OnceLock<bool> = OnceLock::new();

/// Cached probe of the running machine
pub fn hardware_present() -> bool {
    *HARDWARE_PRESENT.get_or_init(|| {
        let present = probe_with(Path::new(MODEL_PATH), std::env::consts::ARCH, Path::new(GPIOMEM_PATH));
        log::debug!("Hardware probe: {}", if present { "present" } else { "absent" });
        present
    })
}

/// The board model names a Raspberry Pi, or failing that the CPU is ARM and
/// the GPIO memory device exists.
pub fn probe_with(model_path: &Path, arch: &str, gpiomem_path: &Path) -> bool {
    match std::fs::read(model_path) {
        Ok(model) => {
            if String::from_utf8_lossy(&model)
                .to_lowercase()
                .contains("raspberry pi")
            {
                return true;
            }
        }
        Err(e) => log::debug!("Cannot read {}: {}", model_path.display(), e),
    }

    (arch.starts_with("arm") || arch == "aarch64") && gpiomem_path.exists()
}
