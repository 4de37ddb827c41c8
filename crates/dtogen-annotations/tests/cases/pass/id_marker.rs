// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use dtogen_annotations::Entity;
use dtogen_core::StoredEntity;
use uuid::Uuid;

#[derive(Entity)]
pub struct ApiToken {
    #[id]
    pub pk: i64,

    pub public_id: Uuid,

    pub secret: String,
}

fn main() {
    let token = ApiToken {
        pk: 41,
        public_id: Uuid::nil(),
        secret: "opaque".to_string(),
    };

    // #[id] wins even though no field is literally named `id`.
    assert_eq!(token.id(), 41);
}
