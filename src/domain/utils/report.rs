use std::io::Write;

use crate::domain::decoder::plan::ReconfigurationResult;
use crate::domain::network::topology::NetworkTopology;
use crate::error::Result;

const HEADERS: [&str; 11] =
    ["connection", "kind", "link", "disrupted", "oldFirst", "oldLast", "newFirst", "newLast", "carriedOver", "fresh", "movePosition"];

/// Writes one `;`-separated row per (connection, link) of the topology.
///
/// Connections without an assignment (disrupted, or no plan at all) leave the new range and the
/// counters empty.
pub fn write_slot_plan<W: Write>(writer: W, topology: &NetworkTopology, result: &ReconfigurationResult) -> Result<()> {
    let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    csv_wtr.write_record(HEADERS)?;

    let optional = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_default();

    for connection in topology.connections() {
        let move_position = result.move_position(&connection.id).map(|position| position as u32);

        for link in &connection.path {
            let old = connection.occupied_on(link);
            let assignment = result.assignment(&connection.id, link);

            let row = [
                connection.id.to_string(),
                format!("{:?}", connection.kind).to_lowercase(),
                link.to_string(),
                result.is_disrupted(&connection.id).to_string(),
                optional(old.map(|r| r.first)),
                optional(old.map(|r| r.last)),
                optional(assignment.map(|a| a.slots.first)),
                optional(assignment.map(|a| a.slots.last)),
                optional(assignment.map(|a| a.carried_over)),
                optional(assignment.map(|a| a.fresh)),
                optional(move_position),
            ];
            csv_wtr.write_record(&row)?;
        }
    }

    csv_wtr.flush()?;
    Ok(())
}
