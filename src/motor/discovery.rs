// Bus scan for DC motor boards

use tracing::{debug, info};

use super::bus::BusProvider;
use super::identity::validate_identity;
use crate::config::BOARD_ADDRESS_RANGE;

/// Probe every valid board address and return those hosting a DC motor board
///
/// Addresses are scanned one at a time in ascending order. Each probe opens
/// its own handle and closes it before the next one; addresses that cannot be
/// opened are skipped.
pub fn scan<P: BusProvider>(provider: &mut P) -> Vec<u8> {
    let mut found = Vec::new();

    for address in BOARD_ADDRESS_RANGE {
        let mut bus = match provider.open(address) {
            Ok(bus) => bus,
            Err(e) => {
                debug!("Skipping 0x{:02X}: {}", address, e);
                continue;
            }
        };
        if validate_identity(&mut bus) {
            debug!("DC motor board found at 0x{:02X}", address);
            found.push(address);
        }
        drop(bus);
    }

    info!("Scan complete: {} board(s) found {:02X?}", found.len(), found);
    found
}
