//! User commands against the active protocol.
//!
//! Each command maps to one pure transition; the caller decides when the
//! returned protocol is persisted.

use crate::feedback::{finalize_day, ActivitySink, FeedbackInput};
use crate::gate::toggle_completed;
use crate::logbook::set_log_field;
use crate::segment::ContentParser;
use crate::{LogField, Protocol, Result};
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq)]
pub enum ProtocolCommand {
    SetField {
        day: usize,
        index: usize,
        field: LogField,
    },
    ToggleCompleted {
        day: usize,
        index: usize,
    },
    FinalizeDay {
        day: usize,
        feedback: FeedbackInput,
    },
}

impl ProtocolCommand {
    pub fn day(&self) -> usize {
        match self {
            Self::SetField { day, .. }
            | Self::ToggleCompleted { day, .. }
            | Self::FinalizeDay { day, .. } => *day,
        }
    }
}

/// Everything a command may need besides the protocol itself
pub struct CommandContext<'a> {
    pub now: DateTime<Utc>,
    pub parser: &'a dyn ContentParser,
    pub sink: &'a mut dyn ActivitySink,
}

/// Apply `command` to `protocol`, returning the new protocol
///
/// On error the input protocol is untouched.
pub fn apply(
    protocol: &Protocol,
    command: &ProtocolCommand,
    ctx: &mut CommandContext<'_>,
) -> Result<Protocol> {
    tracing::debug!("Applying {:?}", command);

    match command {
        ProtocolCommand::SetField { day, index, field } => {
            set_log_field(protocol, *day, *index, field.clone())
        }
        ProtocolCommand::ToggleCompleted { day, index } => {
            toggle_completed(protocol, *day, *index, ctx.now)
        }
        ProtocolCommand::FinalizeDay { day, feedback } => {
            finalize_day(protocol, *day, feedback, ctx.now, ctx.parser, ctx.sink)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logbook::tests::sample_protocol;
    use crate::progress::default_selected_day;
    use crate::segment::MarkerParser;
    use crate::streak::ActivityLog;
    use crate::Error;

    fn run(
        protocol: &Protocol,
        commands: &[ProtocolCommand],
        sink: &mut ActivityLog,
    ) -> Result<Protocol> {
        let mut ctx = CommandContext {
            now: Utc::now(),
            parser: &MarkerParser,
            sink,
        };
        commands
            .iter()
            .try_fold(protocol.clone(), |p, cmd| apply(&p, cmd, &mut ctx))
    }

    fn fill(day: usize, index: usize) -> Vec<ProtocolCommand> {
        vec![
            ProtocolCommand::SetField {
                day,
                index,
                field: LogField::Weight("80".into()),
            },
            ProtocolCommand::SetField {
                day,
                index,
                field: LogField::Sets("3".into()),
            },
            ProtocolCommand::ToggleCompleted { day, index },
        ]
    }

    #[test]
    fn test_full_day_flow() {
        let mut sink = ActivityLog::default();
        let mut commands = fill(0, 0);
        commands.extend(fill(0, 1));
        commands.push(ProtocolCommand::FinalizeDay {
            day: 0,
            feedback: FeedbackInput::new(4, 5, "Boa sessão"),
        });

        let protocol = run(&sample_protocol(), &commands, &mut sink).unwrap();
        assert!(protocol.is_completed(0));
        assert_eq!(protocol.feedbacks.len(), 1);
        assert!(!protocol.current_day_logs.contains_key(&0));
        assert_eq!(default_selected_day(&protocol), 1);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_finalize_with_pending_exercise_fails() {
        let mut sink = ActivityLog::default();
        let protocol = run(&sample_protocol(), &fill(0, 0), &mut sink).unwrap();

        let err = run(
            &protocol,
            &[ProtocolCommand::FinalizeDay {
                day: 0,
                feedback: FeedbackInput::new(4, 5, ""),
            }],
            &mut sink,
        )
        .unwrap_err();

        assert!(matches!(err, Error::IncompleteDay { day: 0, remaining: 1 }));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_command_day() {
        let cmd = ProtocolCommand::ToggleCompleted { day: 7, index: 0 };
        assert_eq!(cmd.day(), 7);
    }
}
