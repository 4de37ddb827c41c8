// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use dtogen_annotations::Entity;
use dtogen_core::StoredEntity;

#[derive(Entity)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

#[derive(Entity)]
pub struct User {
    pub id: i64,

    pub login: String,

    #[dto(exclude)]
    pub password_hash: String,

    #[dto(include)]
    pub group: Option<Group>,

    pub created_at: DateTime<Utc>,
}

fn main() {
    let group = Group {
        id: 3,
        name: "admins".to_string(),
    };
    let user = User {
        id: 7,
        login: "root".to_string(),
        password_hash: "hunter2".to_string(),
        group: Some(group),
        created_at: Utc::now(),
    };

    assert_eq!(user.id(), 7);
    assert_eq!(user.group.as_ref().map(Group::id), Some(3));
}
