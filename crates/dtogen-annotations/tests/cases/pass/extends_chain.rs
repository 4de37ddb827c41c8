// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use dtogen_annotations::Entity;
use dtogen_core::StoredEntity;

#[derive(Entity)]
#[entity(base)]
pub struct Audited {
    pub id: i64,

    pub created: DateTime<Utc>,

    pub updated: DateTime<Utc>,
}

#[derive(Entity)]
#[entity(extends = "Audited")]
pub struct Account {
    pub base: Audited,

    pub email: String,
}

fn main() {
    let account = Account {
        base: Audited {
            id: 19,
            created: Utc::now(),
            updated: Utc::now(),
        },
        email: "ops@example.com".to_string(),
    };

    // The child has no id field of its own; id() delegates through the embed.
    assert_eq!(account.id(), 19);
    assert_eq!(account.base.id(), account.id());
}
