use anyhow::Result;

use super::App;
use super::helpers::read_password;

pub(crate) async fn cmd_register(
    app: &App,
    email: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = read_password(password)?;
    let user_id = app.sign_up(email, &password).await?;

    if json {
        println!("{}", serde_json::json!({ "user_id": user_id, "email": email }));
    } else {
        println!("Registration successful! Signed in as {email}");
    }
    Ok(())
}

pub(crate) async fn cmd_login(
    app: &App,
    email: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = read_password(password)?;
    let user_id = app.sign_in(email, &password).await?;

    if json {
        println!("{}", serde_json::json!({ "user_id": user_id, "email": email }));
    } else {
        println!("You are now logged in as {email}");
    }
    Ok(())
}

pub(crate) fn cmd_logout(app: &App, json: bool) -> Result<()> {
    app.sign_out()?;

    if json {
        println!("{}", serde_json::json!({ "signed_in": false }));
    } else {
        println!("Signed out");
    }
    Ok(())
}

pub(crate) fn cmd_whoami(app: &App, json: bool) -> Result<()> {
    let user_id = app.current_user_id();

    if json {
        println!(
            "{}",
            serde_json::json!({ "signed_in": user_id.is_some(), "user_id": user_id })
        );
    } else {
        match user_id {
            Some(id) => println!("Signed in (user id: {id})"),
            None => println!("Not signed in"),
        }
    }
    Ok(())
}
