//! Binding the configured username to a portal person id

use crate::{Error, Result, types::Record};

/// Resolve `username` (`firstname.lastname`) against the roster, whose
/// `name` fields read `"lastname, firstname"`. Exactly one student must
/// match.
pub fn match_username<'a, I>(username: &str, students: I) -> Result<i64>
where
    I: IntoIterator<Item = &'a Record>,
{
    let (firstname, lastname) = username.split_once('.').ok_or_else(|| {
        Error::user_id_not_matching(format!(
            "username {:?} is not in firstname.lastname form",
            username
        ))
    })?;
    let wanted = format!(
        "{}, {}",
        lastname.trim().to_lowercase(),
        firstname.trim().to_lowercase()
    );

    let mut matches = students
        .into_iter()
        .filter(|student| {
            student
                .str("name")
                .is_some_and(|name| name.trim().to_lowercase() == wanted)
        })
        .map(|student| {
            student
                .i64("personId")
                .ok_or_else(|| Error::missing_field("personId"))
        });

    let person_id = match (matches.next(), matches.next()) {
        (Some(id), None) => id?,
        (None, _) => {
            tracing::error!("Couldn't match username to personId");
            return Err(Error::user_id_not_matching(format!(
                "no roster entry named {:?}",
                wanted
            )));
        }
        (Some(_), Some(_)) => {
            return Err(Error::user_id_not_matching(format!(
                "several roster entries named {:?}",
                wanted
            )));
        }
    };

    Ok(person_id)
}

/// `"Name,+Vorname"` of the classmate row whose `PersonID` is `user_id`,
/// the form the absence endpoint expects
pub fn prepared_name<'a, I>(user_id: i64, classmates: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    classmates
        .into_iter()
        .find(|mate| mate.i64("PersonID") == Some(user_id))
        .map(|mate| format!("{},+{}", mate["Name"], mate["Vorname"]))
        .ok_or_else(|| {
            Error::user_id_not_matching(format!(
                "Couldn't find matching PersonID to user id {}",
                user_id
            ))
        })
}
