//! Property tests: capacity and single-placement hold after every operation

use proptest::prelude::*;
use roster_registry::GroupRegistry;
use roster_types::{
    GroupDraft, GroupId, GroupView, ParticipantId, RenderHandle, RoleName, RosterError,
    SequentialIdGenerator, SystemClock,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

const ROLES: [(&str, u32); 3] = [("Tank", 1), ("Healer", 2), ("DPS", 3)];

#[derive(Debug, Clone)]
enum Op {
    Join { who: u8, role: usize },
    Leave { who: u8 },
    Remove { who: u8, by_owner: bool },
}

fn op_strategy() -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(
        prop_oneof![
            3 => (0u8..10, 0usize..4).prop_map(|(who, role)| Op::Join { who, role }),
            2 => (0u8..10).prop_map(|who| Op::Leave { who }),
            1 => (0u8..10, any::<bool>()).prop_map(|(who, by_owner)| Op::Remove { who, by_owner }),
        ],
        0..64,
    )
}

fn participant(n: u8) -> ParticipantId {
    ParticipantId::new(format!("p{}", n))
}

fn role_name(idx: usize) -> RoleName {
    // Index 3 is a role the group never declared.
    ROLES
        .get(idx)
        .map(|(name, _)| RoleName::from(*name))
        .unwrap_or_else(|| RoleName::from("Bard"))
}

fn setup() -> (GroupRegistry, GroupId) {
    let reg = GroupRegistry::with_sources(
        Box::new(SequentialIdGenerator::new()),
        Arc::new(SystemClock),
    );
    let mut draft = GroupDraft::new("Property", ParticipantId::new("owner"))
        .with_render_target(RenderHandle::new("prop-surface"));
    for (name, capacity) in ROLES {
        draft = draft.with_role(name, capacity);
    }
    let id = reg.create(draft).unwrap().id;
    (reg, id)
}

fn assert_invariants(view: &GroupView) {
    let mut seen = HashSet::new();
    for role in &view.roles {
        assert!(
            role.occupants.len() <= role.capacity as usize,
            "role {} over capacity",
            role.name
        );
        for occupant in &role.occupants {
            assert!(seen.insert(occupant.clone()), "{} placed twice", occupant);
        }
    }
    for entry in &view.waitlist {
        assert!(seen.insert(entry.participant.clone()), "{} placed twice", entry.participant);
    }
}

/// No waiting participant could have been admitted: their role is full.
fn assert_no_stranded_waiters(view: &GroupView) {
    for entry in &view.waitlist {
        let role = view.role(&entry.desired_role).unwrap();
        assert!(role.is_full(), "{} waits for open role {}", entry.participant, role.name);
    }
}

proptest! {
    #[test]
    fn property_roster_invariants_hold(ops in op_strategy()) {
        let (reg, id) = setup();

        for op in ops {
            match op {
                Op::Join { who, role } => {
                    let result = reg.join(&id, &participant(who), &role_name(role));
                    if let Err(err) = result {
                        prop_assert!(matches!(
                            err,
                            RosterError::AlreadyMember(_) | RosterError::UnknownRole(_)
                        ));
                    }
                }
                Op::Leave { who } => {
                    if let Err(err) = reg.leave(&id, &participant(who)) {
                        prop_assert_eq!(err, RosterError::NotAMember(participant(who)));
                    }
                }
                Op::Remove { who, by_owner } => {
                    let requester = if by_owner {
                        ParticipantId::new("owner")
                    } else {
                        participant(who.wrapping_add(1) % 10)
                    };
                    let result = reg.remove_member(&id, &participant(who), &requester, false);
                    if !by_owner {
                        prop_assert_eq!(result.unwrap_err(), RosterError::Forbidden(requester));
                    }
                }
            }

            let view = reg.get(&id).unwrap();
            assert_invariants(&view);
            assert_no_stranded_waiters(&view);
        }
    }

    #[test]
    fn property_promotion_is_fifo_per_role(order in proptest::sample::subsequence((0u8..8).collect::<Vec<_>>(), 2..8)) {
        let (reg, id) = setup();
        let tank = RoleName::from("Tank");

        for who in &order {
            reg.join(&id, &participant(*who), &tank).unwrap();
        }

        // Each departure of the current tank admits the next arrival.
        let mut expected: Vec<ParticipantId> = order.iter().map(|w| participant(*w)).collect();
        let mut admitted = HashMap::new();
        while expected.len() > 1 {
            let current = expected.remove(0);
            let out = reg.leave(&id, &current).unwrap();
            prop_assert_eq!(out.promotions.len(), 1);
            prop_assert_eq!(&out.promotions[0].participant, &expected[0]);
            admitted.insert(expected[0].clone(), out.promotions[0].role.clone());
        }
        prop_assert!(admitted.values().all(|r| r == &tank));
    }
}
