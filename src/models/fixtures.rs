//! Test fixtures shared by unit tests

use super::{author::Author, publication_author::PublicationAuthor};

pub fn author(id: i32, first: &str, last: &str) -> Author {
    Author {
        id,
        first_name: first.to_string(),
        middle_name: None,
        last_name: last.to_string(),
        email: None,
        affiliation: None,
        is_owner: false,
        created_at: None,
        updated_at: None,
    }
}

pub fn link(id: i32, publication_id: i32, author_id: i32, position: i16) -> PublicationAuthor {
    PublicationAuthor {
        id,
        publication_id,
        author_id,
        position,
        is_corresponding: position == 1,
        equal_contribution: false,
    }
}
