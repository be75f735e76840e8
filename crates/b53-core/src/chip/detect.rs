//! Chip probing

use crate::access::RegisterIo;
use crate::error::{Error, Result};
use crate::regs::{mgmt, page, stat, vlan};

use super::{ChipId, ChipIdentity};

/// Reads of the 8-bit device id while it reports zero
pub const ID_RETRIES: u32 = 10;

/// Identify the switch behind `io`
///
/// Reads the 8-bit device id (retrying while it reads zero), resolves the
/// BCM5325 sub-variant from VLAN control 4, falls back to a 16-bit read
/// for the BCM531xx parts and finally records the core revision.
pub fn probe<A: RegisterIo + ?Sized>(io: &mut A) -> Result<ChipIdentity> {
    let mut id8 = io.read8(page::MGMT, mgmt::DEVICE_ID)?;
    let mut attempts = 1;
    while id8 == 0 && attempts < ID_RETRIES {
        id8 = io.read8(page::MGMT, mgmt::DEVICE_ID)?;
        attempts += 1;
    }
    log::debug!("probe: device id {:#04x} after {} reads", id8, attempts);

    let chip_id = if ChipId::is_ambiguous_id(id8) {
        let vc4 = io.read8(page::VLAN, vlan::CTRL4)?;
        log::debug!("probe: BCM5325 VLAN control 4 = {:#04x}", vc4);
        ChipId::from_vc4(vc4)
    } else if let Some(chip) = ChipId::from_device_id8(id8) {
        chip
    } else {
        let id16 = io.read16(page::MGMT, mgmt::DEVICE_ID)?;
        match ChipId::from_device_id16(id16) {
            Some(chip) => chip,
            None => {
                log::error!("probe: unsupported switch id {:#06x}", id16);
                return Err(Error::UnknownChip { id: id16 });
            }
        }
    };

    let core_revision = io.read8(page::STAT, stat::CORE_REV)?;
    let identity = ChipIdentity {
        chip_id,
        core_revision,
    };
    log::info!("Found {}", identity);
    Ok(identity)
}
