//! ContactLog - one row per ended contact between two agents
//!
//! The `Events` column packs both agents' interaction blocks into one
//! string. Each block is the agent's side (`1` or `2`) followed by:
//!
//! | code | meaning |
//! |---|---|
//! | `C` | bodies collided |
//! | `M` / `m<r>` | mated / mate prevented for reason `r` |
//! | `F` / `f<r>` | fought / fight prevented |
//! | `G` / `g<r>` | gave energy / give prevented |
//!
//! e.g. `1CMg2C` or `1F2fP`.

use contracts::{ContactInfo, ContactOutcome, Event, EventKind, EventKinds, LogsConfig, SimContext};
use dispatcher::{Activation, Column, DispatchError, Logger, TableSink, Value};

use crate::support::{close_table, open_sink, open_table};

pub const FILE_PATH: &str = "events/contacts.txt";
pub const TABLE: &str = "Contacts";

#[derive(Default)]
pub struct ContactLog {
    sink: Option<TableSink>,
    buf: String,
}

impl ContactLog {
    const HANDLES: EventKinds = EventKinds::of(&[EventKind::AgentContactEnd]);

    pub fn new() -> Self {
        Self::default()
    }
}

/// Append the block for one agent to `buf`
pub fn encode(info: &ContactInfo, side: char, buf: &mut String) {
    buf.push(side);
    if info.collided {
        buf.push('C');
    }
    encode_outcome(info.mate, 'M', buf);
    encode_outcome(info.fight, 'F', buf);
    encode_outcome(info.give, 'G', buf);
}

fn encode_outcome(outcome: ContactOutcome, code: char, buf: &mut String) {
    match outcome {
        ContactOutcome::NotAttempted => {}
        ContactOutcome::Succeeded => buf.push(code),
        ContactOutcome::Prevented(reason) => {
            buf.push(code.to_ascii_lowercase());
            buf.push(if reason.is_ascii_alphanumeric() {
                reason
            } else {
                '?'
            });
        }
    }
}

impl Logger for ContactLog {
    fn name(&self) -> &'static str {
        "ContactLog"
    }

    fn handles(&self) -> EventKinds {
        Self::HANDLES
    }

    fn init(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<Activation, DispatchError> {
        match &config.contact {
            Some(section) if section.enabled => {
                self.sink = Some(open_table(
                    sim,
                    FILE_PATH,
                    TABLE,
                    vec![
                        Column::int("Timestep"),
                        Column::int("Agent1"),
                        Column::int("Agent2"),
                        Column::string("Events"),
                    ],
                )?);
                Ok(Activation::Enabled)
            }
            _ => Ok(Activation::Disabled),
        }
    }

    fn handle(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        let Event::AgentContactEnd(e) = event else {
            return Err(DispatchError::unexpected_kind(self.name(), event.kind()));
        };
        self.buf.clear();
        encode(&e.a, '1', &mut self.buf);
        encode(&e.b, '2', &mut self.buf);

        open_sink(&mut self.sink, TABLE)?.add_row(&[
            Value::try_from(e.timestep)?,
            Value::try_from(e.a.agent)?,
            Value::try_from(e.b.agent)?,
            self.buf.as_str().into(),
        ])
    }

    fn close(&mut self) -> Result<(), DispatchError> {
        close_table(&mut self.sink)
    }
}
