// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use dtogen_annotations::{Entity, dto_exclude, dto_methods};
use dtogen_core::StoredEntity;
use serde::Serialize;
use validator::Validate;

#[derive(Entity, Validate, Serialize)]
pub struct Customer {
    pub id: i64,

    #[validate(length(min = 1))]
    pub name: String,

    #[validate(email)]
    pub email: String,
}

#[dto_methods]
impl Customer {
    #[dto_method]
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    pub fn is_new(&self) -> bool {
        self.id == 0
    }
}

#[dto_exclude]
pub struct SessionSecret {
    pub token: String,
}

#[dto_exclude]
pub enum Channel {
    Email,
    Sms,
}

fn main() {
    let customer = Customer {
        id: 11,
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    };

    assert_eq!(customer.id(), 11);
    assert!(customer.validate().is_ok());
    assert_eq!(customer.display_name(), "Ada <ada@example.com>");
    assert!(!customer.is_new());

    // Excluded items stay plain Rust items.
    let secret = SessionSecret {
        token: "t".to_string(),
    };
    assert_eq!(secret.token, "t");
    assert!(matches!(Channel::Email, Channel::Email));
}
