use crate::config::Config;
use crate::core::data::RegistrationForm;
use crate::core::traits::{ChatStore, UserStore};
use crate::session::{ChatSession, INVALID_LOGIN, REGISTERED, register};
use crate::storage::Database;
use crate::utils::error::{AppError, AppResult};
use crate::utils::{OutputStyle, print_success, print_warning, prompt_input, prompt_password};

const LOGIN_ATTEMPTS: usize = 3;

pub fn handle_register_command(config: Config) -> AppResult<()> {
    let (users, _) = Database::new(config.general.database.clone()).open_stores()?;
    let form = read_registration_form()?;

    match register(&users, &form)? {
        Ok(()) => print_success(REGISTERED),
        Err(issue) => print_warning(&issue.to_string()),
    }
    Ok(())
}

fn read_registration_form() -> AppResult<RegistrationForm> {
    OutputStyle::print_header("📝 Create an account");
    Ok(RegistrationForm {
        username: prompt_input("Username: ")?,
        email: prompt_input("Email: ")?,
        full_name: prompt_input("Full name: ")?,
        password: prompt_password("Password: ")?,
        confirm: prompt_password("Confirm password: ")?,
    })
}

/// Log `session` in, asking for the username when not given
pub fn login_interactive<U: UserStore, C: ChatStore>(
    session: &mut ChatSession<U, C>,
    username: Option<&str>,
) -> AppResult<()> {
    for _ in 0..LOGIN_ATTEMPTS {
        let username = match username {
            Some(name) => name.to_string(),
            None => prompt_input("Username: ")?,
        };
        let password = prompt_password("Password: ")?;

        if session.login(&username, &password)? {
            let name = session.display_name()?;
            print_success(&format!("Welcome, {}!", name));
            return Ok(());
        }
        print_warning(INVALID_LOGIN);
    }

    Err(AppError::Auth(INVALID_LOGIN.to_string()))
}
