use std::io;

use log::{error, info};
use thiserror::Error;
use vm_manager::{Counters, Simulator, SimulatorError, VADDR_STAMP_OFFSET};

use crate::trace::{TraceError, TraceRecord};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Trace(#[from] TraceError),
    #[error(transparent)]
    Simulator(#[from] SimulatorError),
    #[error("cannot write output: {0}")]
    Io(#[from] io::Error),
}

/// Outcome of replaying a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replay {
    pub counters: Counters,
    /// References whose frame did not carry the stamp of their page.
    pub stamp_mismatches: u64,
}

/// Feeds every record of `trace` to the simulator and checks that each
/// returned frame holds the page it was asked for.
pub fn replay<I>(sim: &mut Simulator, trace: I) -> Result<Replay, DriverError>
where
    I: IntoIterator<Item = Result<TraceRecord, TraceError>>,
{
    let mut stamp_mismatches = 0;
    for record in trace {
        let TraceRecord { access, vaddr } = record?;
        let frame = sim.find_physpage(vaddr, access)?;
        let expected = vaddr.page_base().0;
        let found = read_stamp(frame);
        if found != Some(expected) {
            error!(
                "{} {}: frame holds {:?}, expected {:#x}",
                access, vaddr, found, expected
            );
            stamp_mismatches += 1;
        }
    }
    let counters = *sim.counters();
    let on_swap = sim
        .page_table()
        .iter()
        .filter(|(_, entry)| entry.is_on_swap())
        .count();
    info!(
        "Replayed {} references with {} replacement; {} pages on swap in {} slots",
        counters.ref_count,
        sim.policy_name(),
        on_swap,
        sim.swap_slots_in_use()
    );
    Ok(Replay {
        counters,
        stamp_mismatches,
    })
}

fn read_stamp(frame: &[u8]) -> Option<u64> {
    let bytes = frame.get(VADDR_STAMP_OFFSET..VADDR_STAMP_OFFSET + 8)?;
    let mut stamp = [0u8; 8];
    stamp.copy_from_slice(bytes);
    Some(u64::from_be_bytes(stamp))
}
