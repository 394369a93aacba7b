use std::collections::HashMap;

use axum_extra::extract::cookie::{Cookie, SameSite};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};

use crate::{models::User, AppState};

pub type FieldErrors = HashMap<String, String>;

#[derive(serde::Serialize)]
struct Claims {
    // user email
    sub: String,
    // expiry (unix timestamp seconds)
    exp: usize,
}

pub fn make_jwt_with_days(state: &AppState, email: &str, days: i64) -> Result<String, String> {
    let exp = (Utc::now() + Duration::days(days)).timestamp() as usize;

    let claims = Claims {
        sub: email.to_string(),
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.settings.jwt_secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn auth_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    if state.settings.cookie_secure {
        cookie.set_secure(true);
    }
    cookie
}

pub fn clear_auth_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = Cookie::new(state.settings.jwt_cookie_name.clone(), "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.make_removal();
    cookie
}

pub fn login_user(state: &AppState, email: &str, password: &str) -> Result<User, FieldErrors> {
    let mut errs: FieldErrors = HashMap::new();

    let Some(user) = state.users.find_by_email(email) else {
        errs.insert("_form".into(), "Invalid email or password.".into());
        return Err(errs);
    };

    if !verify(password, &user.password_hash).unwrap_or(false) {
        errs.insert("_form".into(), "Invalid email or password.".into());
        return Err(errs);
    }

    Ok(user)
}

pub fn register_user(
    state: &AppState,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, FieldErrors> {
    let mut errs: FieldErrors = HashMap::new();

    if state.users.find_by_email(email).is_some() {
        errs.insert("email".into(), "Email has already been taken!".into());
        return Err(errs);
    }

    if state.users.username_taken(username) {
        errs.insert("username".into(), "Username has already been taken!".into());
        return Err(errs);
    }

    let pw_hash = match hash(password, DEFAULT_COST) {
        Ok(h) => h,
        Err(_) => {
            errs.insert(
                "_form".into(),
                "There is a problem registering this user!".into(),
            );
            return Err(errs);
        }
    };

    let user = User {
        email: email.to_string(),
        username: username.to_string(),
        password_hash: pw_hash,
        created_at: Utc::now().timestamp(),
    };

    if !state.users.insert(user.clone()) {
        errs.insert("email".into(), "Email has already been taken!".into());
        return Err(errs);
    }

    Ok(user)
}
