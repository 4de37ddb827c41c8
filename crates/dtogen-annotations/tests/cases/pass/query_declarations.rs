// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use dtogen_annotations::Entity;
use dtogen_core::StoredEntity;

#[derive(Entity)]
pub struct Group {
    pub id: i64,

    pub name: String,
}

#[derive(Entity)]
#[dto_extends(name = "group_name", ty = "String", path = "group.name")]
#[conventional_query(
    name = "find_by_login",
    is_collection = false,
    parameters(param(name = "login", ty = "String"))
)]
#[native_queries(
    native_query(query = "SELECT * FROM users WHERE locked", name = "locked_users"),
    native_query(
        query = "DELETE FROM users WHERE id = :id",
        name = "purge",
        is_modifying,
        parameters(param(name = "id", ty = "i64"))
    )
)]
pub struct User {
    pub id: i64,

    pub login: String,

    #[dto(include = "dto")]
    pub group: Option<Group>,
}

fn main() {
    let user = User {
        id: 23,
        login: "auditor".to_string(),
        group: Some(Group {
            id: 2,
            name: "auditors".to_string(),
        }),
    };

    // Query and synthetic-field declarations are inert; they only have to
    // validate and leave the struct usable.
    assert_eq!(user.id(), 23);
    assert_eq!(user.group.as_ref().map(Group::id), Some(2));
}
