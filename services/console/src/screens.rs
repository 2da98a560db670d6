//! Player and admin menus

use client::App;
use common::{
    Rarity,
    models::{Matto, User},
};
use dialoguer::{Confirm, Input, Password, Select};

use crate::prompt::DialoguerPrompter;

type ConsoleApp = App<DialoguerPrompter>;

const PLAYER_MENU: [&str; 10] = [
    "🏆 Leaderboard",
    "🎭 Gallery",
    "📝 Register",
    "🔑 Log in",
    "📸 Upload a matto",
    "🖼️  My matti",
    "🔄 Refresh",
    "🚪 Log out",
    "🛡️  Admin panel",
    "Quit",
];

const ADMIN_MENU: [&str; 11] = [
    "📊 Stats",
    "👥 Users",
    "➕ Create user",
    "✏️  Edit user",
    "🗑️  Delete user",
    "🎭 Matti",
    "👁️  Approve or hide a matto",
    "🗑️  Delete matto",
    "💥 Reset all points",
    "🔄 Refresh",
    "🔒 Lock and go back",
];

pub async fn main_menu(app: &mut ConsoleApp) -> anyhow::Result<()> {
    loop {
        let who = match app.current_user() {
            Some(user) => format!("{} ({}pt)", user.username, user.total_points),
            None => "not logged in".to_string(),
        };
        let choice = Select::new()
            .with_prompt(format!("FANTAMATTO - {}", who))
            .items(&PLAYER_MENU)
            .default(0)
            .interact()?;

        match choice {
            0 => show_leaderboard(app),
            1 => show_gallery(app),
            2 => {
                let username: String = Input::new().with_prompt("Username").interact_text()?;
                let password = Password::new()
                    .with_prompt("Password (empty for none)")
                    .allow_empty_password(true)
                    .interact()?;
                let password = Some(password.as_str()).filter(|p| !p.is_empty());
                if app.on_register(&username, password).await {
                    println!("Welcome, {}!", username.trim());
                }
            }
            3 => {
                let username: String = Input::new().with_prompt("Username").interact_text()?;
                let password = Password::new().with_prompt("Password").interact()?;
                if app.on_login(&username, &password).await {
                    println!("Welcome back, {}!", username.trim());
                }
            }
            4 => upload(app).await?,
            5 => show_my_matti(app).await,
            6 => app.on_refresh().await,
            7 => app.on_logout(),
            8 => admin_menu(app).await?,
            _ => {
                app.on_admin_lock().await;
                return Ok(());
            }
        }
    }
}

fn show_leaderboard(app: &ConsoleApp) {
    let rows = app.leaderboard().rows(app.current_user().map(|u| u.id));
    println!("\n🏆 LEADERBOARD");
    if rows.is_empty() {
        println!("   nobody yet");
    }
    for row in rows {
        let you = if row.is_current { "  ← you" } else { "" };
        println!("{:>4} {:<24} {:>6}pt{}", row.marker, row.username, row.points, you);
    }
    println!();
}

fn show_gallery(app: &ConsoleApp) {
    let cards = app.gallery().cards();
    println!("\n🎭 GALLERY");
    if cards.is_empty() {
        println!("   no matti yet");
    }
    for card in cards {
        println!(
            "{} {:<10} {:<24} @{:<16} {}",
            card.rarity.icon(),
            card.badge,
            card.nickname,
            card.username,
            card.points_label
        );
        if let Some(description) = card.description {
            println!("     {}", description);
        }
    }
    println!();
}

async fn show_my_matti(app: &ConsoleApp) {
    let Some(matti) = app.on_my_matti().await else {
        return;
    };
    println!("\n🖼️  MY MATTI");
    if matti.is_empty() {
        println!("   nothing uploaded yet");
    }
    for matto in matti {
        println!(
            "{} {:<10} {:<24} +{}pt",
            matto.rarity.icon(),
            matto.rarity.badge(),
            matto.nickname,
            matto.points
        );
    }
    println!();
}

async fn upload(app: &mut ConsoleApp) -> anyhow::Result<()> {
    let path: String = Input::new()
        .with_prompt("Photo file")
        .allow_empty(true)
        .interact_text()?;
    if !path.trim().is_empty() {
        app.on_select_photo(path.trim()).await;
    }

    let nickname: String = Input::new()
        .with_prompt("Nickname")
        .allow_empty(true)
        .interact_text()?;
    app.on_nickname(&nickname);

    let description: String = Input::new()
        .with_prompt("Description (optional)")
        .allow_empty(true)
        .interact_text()?;
    app.on_description(&description);

    let tiers: Vec<String> = Rarity::ALL
        .iter()
        .map(|r| format!("{} {} (+{}pt)", r.icon(), r.badge(), r.points()))
        .collect();
    let tier = Select::new()
        .with_prompt("Rarity")
        .items(&tiers)
        .default(0)
        .interact()?;
    app.on_rarity(Rarity::ALL[tier]);

    if let Some(matto) = app.on_submit().await {
        println!(
            "{} uploaded, +{}pt!",
            matto.nickname, matto.points
        );
    }
    Ok(())
}

async fn admin_menu(app: &mut ConsoleApp) -> anyhow::Result<()> {
    if !app.admin().is_unlocked() {
        let password = Password::new().with_prompt("Admin password").interact()?;
        if !app.on_admin_unlock(&password).await {
            return Ok(());
        }
    }

    loop {
        let choice = Select::new()
            .with_prompt("ADMIN")
            .items(&ADMIN_MENU)
            .default(0)
            .interact()?;

        match choice {
            0 => show_stats(app),
            1 => show_users(app),
            2 => {
                let username: String = Input::new().with_prompt("Username").interact_text()?;
                let password = Password::new().with_prompt("Password").interact()?;
                app.on_admin_create_user(&username, &password).await;
            }
            3 => {
                if let Some(user) = pick_user(app)? {
                    edit_user(app, &user).await?;
                }
            }
            4 => {
                if let Some(user) = pick_user(app)? {
                    app.on_admin_delete_user(user.id).await;
                }
            }
            5 => show_matti(app),
            6 => {
                if let Some(matto) = pick_matto(app)? {
                    let approve = Confirm::new()
                        .with_prompt(format!("Show \"{}\" in the public gallery?", matto.nickname))
                        .default(matto.is_approved)
                        .interact()?;
                    app.on_admin_moderate_matto(matto.id, approve).await;
                }
            }
            7 => {
                if let Some(matto) = pick_matto(app)? {
                    app.on_admin_delete_matto(matto.id).await;
                }
            }
            8 => {
                if app.on_admin_reset_points().await {
                    println!("All points reset.");
                }
            }
            9 => {
                app.on_admin_refresh().await;
            }
            _ => {
                app.on_admin_lock().await;
                return Ok(());
            }
        }

        // an expired token locks the panel
        if !app.admin().is_unlocked() {
            return Ok(());
        }
    }
}

fn show_stats(app: &ConsoleApp) {
    let stats = app.admin().stats().data.unwrap_or_default();
    println!("\n📊 STATS");
    println!("   users          {}", stats.total_users);
    println!("   matti          {}", stats.total_matti);
    println!("   total points   {}", stats.total_points);
    println!("   pending        {}\n", stats.pending_matti);
}

fn user_line(user: &User) -> String {
    format!(
        "{:<24} {:>6}pt {}",
        user.username,
        user.total_points,
        if user.is_active { "active" } else { "disabled" }
    )
}

fn matto_line(matto: &Matto) -> String {
    format!(
        "{} {:<10} {:<24} @{:<16} +{}pt {}",
        matto.rarity.icon(),
        matto.rarity.badge(),
        matto.nickname,
        matto.username,
        matto.points,
        if matto.is_approved { "" } else { "(hidden)" }
    )
}

fn show_users(app: &ConsoleApp) {
    println!("\n👥 USERS");
    for user in app.admin().users().data.unwrap_or_default() {
        println!("   {}", user_line(&user));
    }
    println!();
}

fn show_matti(app: &ConsoleApp) {
    println!("\n🎭 MATTI");
    for matto in app.admin().matti().data.unwrap_or_default() {
        println!("   {}", matto_line(&matto));
    }
    println!();
}

fn pick_user(app: &ConsoleApp) -> anyhow::Result<Option<User>> {
    let users = app.admin().users().data.unwrap_or_default();
    if users.is_empty() {
        println!("No users.");
        return Ok(None);
    }
    let lines: Vec<String> = users.iter().map(user_line).collect();
    let index = Select::new()
        .with_prompt("User")
        .items(&lines)
        .interact_opt()?;
    Ok(index.map(|i| users[i].clone()))
}

fn pick_matto(app: &ConsoleApp) -> anyhow::Result<Option<Matto>> {
    let matti = app.admin().matti().data.unwrap_or_default();
    if matti.is_empty() {
        println!("No matti.");
        return Ok(None);
    }
    let lines: Vec<String> = matti.iter().map(matto_line).collect();
    let index = Select::new()
        .with_prompt("Matto")
        .items(&lines)
        .interact_opt()?;
    Ok(index.map(|i| matti[i].clone()))
}

async fn edit_user(app: &mut ConsoleApp, user: &User) -> anyhow::Result<()> {
    let mut modal = app.on_admin_edit_user(user);

    loop {
        let draft = modal.draft_mut();
        let username: String = Input::new()
            .with_prompt("Username")
            .with_initial_text(draft.username.clone().unwrap_or_default())
            .interact_text()?;
        let points: i64 = Input::new()
            .with_prompt("Points")
            .with_initial_text(draft.total_points.unwrap_or_default().to_string())
            .interact_text()?;
        let active = Confirm::new()
            .with_prompt("Active?")
            .default(draft.is_active.unwrap_or(true))
            .interact()?;
        let password = Password::new()
            .with_prompt("New password (empty to keep)")
            .allow_empty_password(true)
            .interact()?;

        draft.username = Some(username);
        draft.total_points = Some(points);
        draft.is_active = Some(active);
        draft.password = Some(password).filter(|p| !p.is_empty());

        if !Confirm::new().with_prompt("Save?").default(true).interact()? {
            modal.cancel();
            return Ok(());
        }
        if app.on_admin_save_user(&modal).await {
            return Ok(());
        }
        if !Confirm::new()
            .with_prompt("Edit again?")
            .default(true)
            .interact()?
        {
            modal.cancel();
            return Ok(());
        }
    }
}
