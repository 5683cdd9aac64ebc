// SPDX-License-Identifier: MIT

use super::*;

#[yare::parameterized(
    start = { TaskState::Created, TransitionEvent::Start, TaskState::WorkerExecuting },
    worker_success = { TaskState::WorkerExecuting, TransitionEvent::Success, TaskState::AuditPending },
    worker_crash = { TaskState::WorkerExecuting, TransitionEvent::Crash, TaskState::RecoveryPending },
    worker_inactivity = { TaskState::WorkerExecuting, TransitionEvent::Inactivity, TaskState::RecoveryPending },
    audit_next = { TaskState::AuditPending, TransitionEvent::Next, TaskState::AuditorExecuting },
    auditor_done = { TaskState::AuditorExecuting, TransitionEvent::Done, TaskState::Completed },
    auditor_retry = { TaskState::AuditorExecuting, TransitionEvent::Retry, TaskState::ReiterationPending },
    auditor_impossible = { TaskState::AuditorExecuting, TransitionEvent::Impossible, TaskState::Rejected },
    auditor_crash_is_fatal = { TaskState::AuditorExecuting, TransitionEvent::Crash, TaskState::Failed },
    auditor_inactivity_is_fatal = { TaskState::AuditorExecuting, TransitionEvent::Inactivity, TaskState::Failed },
    reiteration_next = { TaskState::ReiterationPending, TransitionEvent::Next, TaskState::WorkerExecuting },
    reiteration_max = { TaskState::ReiterationPending, TransitionEvent::MaxIterations, TaskState::Failed },
    recovery_success = { TaskState::RecoveryPending, TransitionEvent::ZombieSuccess, TaskState::AuditPending },
    recovery_partial = { TaskState::RecoveryPending, TransitionEvent::ZombiePartial, TaskState::ReiterationPending },
    recovery_dead = { TaskState::RecoveryPending, TransitionEvent::ZombieDead, TaskState::Failed },
)]
fn authoritative_transitions(from: TaskState, event: TransitionEvent, to: TaskState) {
    assert_eq!(transition(from, event).unwrap(), to);
}

#[test]
fn interrupt_is_valid_from_every_non_terminal_state() {
    for state in [
        TaskState::Created,
        TaskState::WorkerExecuting,
        TaskState::AuditPending,
        TaskState::AuditorExecuting,
        TaskState::ReiterationPending,
        TaskState::RecoveryPending,
    ] {
        assert_eq!(
            transition(state, TransitionEvent::Interrupt).unwrap(),
            TaskState::Interrupted
        );
    }
}

#[test]
fn unlisted_pair_is_invalid() {
    let err = transition(TaskState::Completed, TransitionEvent::Start).unwrap_err();
    assert_eq!(err.state, TaskState::Completed);
}

#[test]
fn terminal_states_have_no_outgoing_transitions() {
    for state in [
        TaskState::Completed,
        TaskState::Rejected,
        TaskState::Failed,
        TaskState::Interrupted,
    ] {
        assert!(state.is_terminal());
        for event in [
            TransitionEvent::Start,
            TransitionEvent::Success,
            TransitionEvent::Next,
            TransitionEvent::Interrupt,
        ] {
            assert!(transition(state, event).is_err());
        }
    }
}

#[test]
fn next_action_mapping() {
    assert_eq!(next_action(TaskState::Created), NextAction::RunWorker);
    assert_eq!(
        next_action(TaskState::ReiterationPending),
        NextAction::RunWorker
    );
    assert_eq!(next_action(TaskState::AuditPending), NextAction::RunAuditor);
    assert_eq!(next_action(TaskState::RecoveryPending), NextAction::Recover);
    assert_eq!(
        next_action(TaskState::WorkerExecuting),
        NextAction::Wait
    );
    assert_eq!(
        next_action(TaskState::Completed),
        NextAction::Exit {
            reason: TaskState::Completed
        }
    );
}
