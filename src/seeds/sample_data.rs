use chrono::{DateTime, Utc};

use crate::models::{Course, StudySession};

/// Sample sessions added per populate run
pub const MAX_SAMPLE_SESSIONS: usize = 10;

/// Sample course catalog for a period.
pub fn sample_courses(period: &str, now: i64) -> Vec<Course> {
    let catalog = [
        ("COEN 12", "Abstract Data Types and Data Structures", "Dr. Smith", "01", "MWF 9:15-10:20 AM", "Bannan 130"),
        ("COEN 20", "Embedded Systems", "Dr. Johnson", "01", "TTh 2:15-3:55 PM", "Bannan 142"),
        ("MATH 53", "Multivariable Calculus", "Prof. Wilson", "02", "MWF 11:45 AM-12:50 PM", "O'Keefe 110"),
        ("PHYS 33", "Electricity and Magnetism", "Dr. Brown", "01", "TTh 9:15-10:55 AM", "Daly Science 206"),
        ("ENGL 2", "Critical Thinking and Writing", "Prof. Davis", "03", "MWF 1:15-2:20 PM", "Kenna 205"),
        ("COEN 79", "Object-Oriented Programming", "Dr. Martinez", "01", "TTh 11:45 AM-1:25 PM", "Bannan 150"),
    ];

    catalog
        .iter()
        .map(|(code, name, instructor, section, schedule, location)| Course {
            code: code.to_string(),
            period: period.to_string(),
            name: name.to_string(),
            instructor: instructor.to_string(),
            section: section.to_string(),
            schedule: schedule.to_string(),
            location: location.to_string(),
            units: 4,
            student_ids: vec![],
            created_at: now,
        })
        .collect()
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            log::warn!("   ⚠️  Skipping sample session with bad time '{}': {}", raw, e);
            None
        }
    }
}

/// Sample study sessions owned by `creator_id`, with no attendees.
pub fn sample_sessions(period: &str, creator_id: &str, now: i64) -> Vec<StudySession> {
    let sessions = [
        ("COEN 12", "Data Structures Study Group", "Working through linked lists, stacks and hash tables", "Engineering Library Study Room 201", "2025-04-15T14:00:00Z", "2025-04-15T16:00:00Z"),
        ("MATH 53", "Multivariable Calculus Help Session", "Midterm review: partial derivatives and multiple integrals", "Orradre Library Group Study Area", "2025-04-16T19:00:00Z", "2025-04-16T21:00:00Z"),
        ("PHYS 33", "Physics Lab Prep", "Experimental procedures and data analysis techniques", "Daly Science Center Room 208", "2025-04-17T16:30:00Z", "2025-04-17T18:30:00Z"),
        ("COEN 20", "Embedded Systems Lab Review", "Assembly exercises and board bring-up questions", "Bannan 142", "2025-04-18T13:00:00Z", "2025-04-18T15:00:00Z"),
        ("ENGL 2", "Essay Writing Workshop", "Peer review of argumentative essays", "Kenna Hall Writing Center", "2025-04-19T11:00:00Z", "2025-04-19T13:00:00Z"),
        ("COEN 79", "OOP Design Patterns", "Inheritance, templates and the observer pattern", "Bannan 150", "2025-04-20T15:00:00Z", "2025-04-20T17:00:00Z"),
        ("COEN 12", "Trees and Graphs Practice", "Traversals, BSTs and graph search problems", "Engineering Library Study Room 105", "2025-04-21T18:00:00Z", "2025-04-21T20:00:00Z"),
        ("MATH 53", "Vector Calculus Workshop", "Line integrals, Green's and Stokes' theorems", "O'Keefe 110", "2025-04-22T14:30:00Z", "2025-04-22T16:30:00Z"),
        ("PHYS 33", "Electrostatics Problem Session", "Gauss's law and electric potential problems", "Daly Science Center Study Lounge", "2025-04-23T10:00:00Z", "2025-04-23T12:00:00Z"),
        ("ENGL 2", "Rhetorical Analysis Discussion", "Analyzing primary sources before the exam", "Varsi Hall Study Lounge", "2025-04-24T17:00:00Z", "2025-04-24T19:00:00Z"),
        ("COEN 20", "Interrupts and Timers Review", "Final project planning", "Bannan 130", "2025-04-25T12:00:00Z", "2025-04-25T14:00:00Z"),
    ];

    sessions
        .iter()
        .take(MAX_SAMPLE_SESSIONS)
        .filter_map(|(code, title, description, location, start, end)| {
            Some(StudySession {
                id: uuid::Uuid::new_v4().to_string(),
                period: period.to_string(),
                course_code: code.to_string(),
                title: title.to_string(),
                description: Some(description.to_string()),
                location: location.to_string(),
                start_time: parse_time(start)?,
                end_time: parse_time(end)?,
                creator_id: creator_id.to_string(),
                attendee_ids: vec![],
                created_at: now,
                updated_at: now,
            })
        })
        .collect()
}
