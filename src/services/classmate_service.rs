use crate::{
    database::Store,
    models::{Classmate, Course},
    services::course_service,
    utils::text::codes_match,
};

/// Every other student sharing at least one resolved course with `user_id`.
///
/// Candidates come from a course-membership query over all users, which is
/// equivalent to scanning every user and intersecting course sets. The
/// requester is never included. Store failures collapse to an empty list.
pub async fn get_classmates_for_user(db: &dyn Store, period: &str, user_id: &str) -> Vec<Classmate> {
    let my_courses = course_service::get_user_courses(db, period, user_id).await;
    if my_courses.is_empty() {
        return vec![];
    }

    let my_codes: Vec<String> = my_courses.iter().map(|c| c.code.clone()).collect();

    let candidates = match db.find_users_with_any_course(period, &my_codes).await {
        Ok(users) => users,
        Err(e) => {
            log::error!("❌ Error loading classmates for {}: {}", user_id, e);
            return vec![];
        }
    };

    candidates
        .into_iter()
        .filter(|other| other.id != user_id)
        .filter_map(|other| {
            let shared: Vec<Course> = my_courses
                .iter()
                .filter(|course| other.is_enrolled(period, &course.code))
                .cloned()
                .collect();

            if shared.is_empty() {
                None
            } else {
                Some(Classmate::from_user(other, shared))
            }
        })
        .collect()
}

/// Classmates restricted to one course.
pub async fn get_classmates_for_course(
    db: &dyn Store,
    period: &str,
    user_id: &str,
    course_code: &str,
) -> Vec<Classmate> {
    get_classmates_for_user(db, period, user_id)
        .await
        .into_iter()
        .filter(|c| c.shared_courses.iter().any(|code| codes_match(code, course_code)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{FailingStore, MemoryStore};
    use crate::models::User;
    use crate::services::course_service::enroll;

    const P: &str = "Spring 2025 Quarter";

    async fn student(store: &MemoryStore, id: &str, name: &str, courses: &[&str]) {
        store
            .insert_user(&User::new_from_identity(
                id,
                &format!("{}@scu.edu", id),
                Some(name.to_string()),
                None,
            ))
            .await
            .unwrap();
        for code in courses {
            enroll(store, P, id, code).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_single_shared_course_is_mutual() {
        let store = MemoryStore::new();
        student(&store, "alice", "Alice Ng", &["COEN 12", "MATH 53"]).await;
        student(&store, "bob", "Bob Ortiz", &["COEN 12", "PHYS 33"]).await;

        let alice_view = get_classmates_for_user(&store, P, "alice").await;
        assert_eq!(alice_view.len(), 1);
        assert_eq!(alice_view[0].id, "bob");
        assert_eq!(alice_view[0].shared_courses, vec!["COEN 12".to_string()]);
        assert_eq!(alice_view[0].first_name, "Bob");

        let bob_view = get_classmates_for_user(&store, P, "bob").await;
        assert_eq!(bob_view.len(), 1);
        assert_eq!(bob_view[0].id, "alice");
        assert_eq!(bob_view[0].shared_courses, vec!["COEN 12".to_string()]);
    }

    #[tokio::test]
    async fn test_requester_never_included() {
        let store = MemoryStore::new();
        student(&store, "alice", "Alice Ng", &["COEN 12"]).await;
        student(&store, "bob", "Bob Ortiz", &["COEN 12"]).await;

        let classmates = get_classmates_for_user(&store, P, "alice").await;
        assert!(classmates.iter().all(|c| c.id != "alice"));
    }

    #[tokio::test]
    async fn test_no_overlap_no_classmates() {
        let store = MemoryStore::new();
        student(&store, "alice", "Alice Ng", &["COEN 12"]).await;
        student(&store, "bob", "Bob Ortiz", &["MATH 53"]).await;
        student(&store, "carol", "Carol", &[]).await;

        assert!(get_classmates_for_user(&store, P, "alice").await.is_empty());
        assert!(get_classmates_for_user(&store, P, "carol").await.is_empty());
    }

    #[tokio::test]
    async fn test_shared_course_details_and_course_filter() {
        let store = MemoryStore::new();
        student(&store, "alice", "Alice Ng", &["COEN 12", "MATH 53"]).await;
        student(&store, "bob", "Bob Ortiz", &["COEN 12", "MATH 53"]).await;
        student(&store, "dan", "Dan Wu", &["MATH 53"]).await;

        let classmates = get_classmates_for_user(&store, P, "alice").await;
        let bob = classmates.iter().find(|c| c.id == "bob").unwrap();
        assert_eq!(bob.shared_course_details.len(), 2);

        let in_coen = get_classmates_for_course(&store, P, "alice", "COEN12").await;
        assert_eq!(in_coen.len(), 1);
        assert_eq!(in_coen[0].id, "bob");

        let in_math = get_classmates_for_course(&store, P, "alice", "MATH 53").await;
        assert_eq!(in_math.len(), 2);
    }

    #[tokio::test]
    async fn test_other_period_enrollments_are_not_classmates() {
        let store = MemoryStore::new();
        student(&store, "alice", "Alice Ng", &[]).await;
        student(&store, "bob", "Bob Ortiz", &["COEN 12"]).await;
        enroll(&store, "Fall 2024 Quarter", "alice", "COEN 12").await.unwrap();

        assert!(get_classmates_for_user(&store, P, "bob").await.is_empty());
        assert!(get_classmates_for_user(&store, P, "alice").await.is_empty());
        assert!(get_classmates_for_user(&store, "Fall 2024 Quarter", "alice").await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failures_yield_no_classmates() {
        let mut store = FailingStore::new().fail_reads_of("alice");
        student(&store.inner, "alice", "Alice Ng", &["COEN 12"]).await;
        student(&store.inner, "bob", "Bob Ortiz", &["COEN 12"]).await;

        // Requester's own document cannot be read
        assert!(get_classmates_for_user(&store, P, "alice").await.is_empty());

        assert_eq!(get_classmates_for_user(&store, P, "bob").await.len(), 1);
        // Candidate query fails
        store.fail_user_queries = true;
        assert!(get_classmates_for_user(&store, P, "bob").await.is_empty());
        assert!(get_classmates_for_course(&store, P, "bob", "COEN 12").await.is_empty());
    }
}
