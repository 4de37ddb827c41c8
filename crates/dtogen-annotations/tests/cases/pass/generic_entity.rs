// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use dtogen_annotations::Entity;
use dtogen_core::StoredEntity;

#[derive(Entity)]
pub struct Envelope<T: Clone> {
    pub id: i64,

    pub payload: T,
}

fn main() {
    let text = Envelope {
        id: 5,
        payload: "hello".to_string(),
    };
    let number = Envelope {
        id: 6,
        payload: 1.5_f64,
    };

    assert_eq!(text.id(), 5);
    assert_eq!(number.id(), 6);
}
