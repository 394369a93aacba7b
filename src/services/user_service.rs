use bcrypt::{hash, verify, DEFAULT_COST};

use crate::AppState;

use super::auth_service::FieldErrors;

pub fn change_username(state: &AppState, email: &str, new_username: &str) -> Result<(), FieldErrors> {
    let mut errs = FieldErrors::new();

    let Some(mut user) = state.users.find_by_email(email) else {
        errs.insert("_form".into(), "User not found.".into());
        return Err(errs);
    };

    if user.username != new_username && state.users.username_taken(new_username) {
        errs.insert("username".into(), "This username is already in use.".into());
        return Err(errs);
    }

    user.username = new_username.to_string();
    if !state.users.update(user) {
        errs.insert("_form".into(), "Could not save the new username.".into());
        return Err(errs);
    }

    Ok(())
}

pub fn change_password(
    state: &AppState,
    email: &str,
    current_password: &str,
    new_password: &str,
) -> Result<(), FieldErrors> {
    let mut errs = FieldErrors::new();

    let Some(mut user) = state.users.find_by_email(email) else {
        errs.insert("_form".into(), "User not found.".into());
        return Err(errs);
    };

    if !verify(current_password, &user.password_hash).unwrap_or(false) {
        errs.insert("currentPassword".into(), "Current password is wrong.".into());
        return Err(errs);
    }

    let pw_hash = match hash(new_password, DEFAULT_COST) {
        Ok(h) => h,
        Err(_) => {
            errs.insert("_form".into(), "Could not update the password.".into());
            return Err(errs);
        }
    };

    user.password_hash = pw_hash;
    if !state.users.update(user) {
        errs.insert("_form".into(), "Could not update the password.".into());
        return Err(errs);
    }

    Ok(())
}
