use uuid::Uuid;

/// Access policy for gated plan content.
///
/// Full content is visible to the owning trainer and to anyone holding a
/// subscription to the plan. Subscription expiry is recorded but does not
/// revoke access here; an expired subscriber still passes this check.
pub fn can_view_full_content(requester_id: Uuid, trainer_id: Uuid, subscriber_ids: &[Uuid]) -> bool {
    requester_id == trainer_id || subscriber_ids.contains(&requester_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_always_sees_full_content() {
        let trainer = Uuid::new_v4();
        assert!(can_view_full_content(trainer, trainer, &[]));
    }

    #[test]
    fn subscriber_sees_full_content() {
        let trainer = Uuid::new_v4();
        let user = Uuid::new_v4();
        assert!(can_view_full_content(user, trainer, &[Uuid::new_v4(), user]));
    }

    #[test]
    fn non_subscriber_is_denied() {
        let trainer = Uuid::new_v4();
        let user = Uuid::new_v4();
        assert!(!can_view_full_content(user, trainer, &[Uuid::new_v4()]));
    }

    #[test]
    fn owner_with_no_subscribers_still_granted() {
        let trainer = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        assert!(can_view_full_content(trainer, trainer, &[stranger]));
        assert!(!can_view_full_content(stranger, trainer, &[]));
    }
}
