use anyhow::{Context, Result};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

/// Environment variable holding the master password.
pub const PASSWORD_ENV: &str = "KDB1_PASSWORD";

/// Reads the master password.
///
/// KeePass 1.x allows an empty master password, so an empty value is accepted
/// from every source.
pub fn read_password() -> Result<Zeroizing<String>> {
    //  Environment Variable
    //  KDB1_PASSWORD="supersecret" kdb1 --file db.kdb entries
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(Zeroizing::new(pw));
    }

    //  stdin (Pipeline)
    //  echo "supersecret" | kdb1 --file db.kdb entries
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin()
            .lock()
            .read_line(&mut buf)
            .context("failed to read password from stdin")?;
        trim_newline(&mut buf);
        return Ok(buf);
    }

    //  Interactive (TTY)
    let pw = rpassword::prompt_password("Password: ").context("failed to read password")?;
    Ok(Zeroizing::new(pw))
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
