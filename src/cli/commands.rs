use crate::app::{AppContext, Result};
use crate::domain::User;

pub async fn list_users(ctx: &AppContext, page: Option<u32>) -> Result<()> {
    let users = match page {
        Some(page) => ctx.provider.fetch_page(page).await?,
        None => ctx.provider.fetch_initial_users().await?,
    };

    if users.is_empty() {
        println!("No users");
        return Ok(());
    }

    for user in &users {
        print_user(ctx, user);
    }
    Ok(())
}

fn print_user(ctx: &AppContext, user: &User) {
    let marker = if ctx.interactions.is_seen(user.id) {
        " "
    } else {
        "●"
    };
    println!("{} {:>4}  {:<24} {}", marker, user.id, user.name, user.profile_picture_url);
}

pub async fn show_story(ctx: &AppContext, user_id: i64) -> Result<()> {
    let story = ctx.provider.fetch_story(user_id).await?;

    println!("Story of user {} ({} items)", story.user_id, story.len());
    for item in &story.items {
        let marker = if ctx.interactions.is_liked(&item.id) {
            "♥"
        } else {
            " "
        };
        println!("{} {:<8} {}", marker, item.id, item.image_url);
    }
    Ok(())
}

pub fn toggle_like(ctx: &AppContext, item_id: &str) -> Result<()> {
    if ctx.interactions.toggle_liked(item_id)? {
        println!("Liked {}", item_id);
    } else {
        println!("Unliked {}", item_id);
    }
    Ok(())
}

pub fn list_seen(ctx: &AppContext) -> Result<()> {
    let seen = ctx.interactions.snapshot().sorted_seen();
    if seen.is_empty() {
        println!("No stories seen yet");
        return Ok(());
    }

    println!("Seen {} users:", seen.len());
    for user_id in seen {
        println!("  {}", user_id);
    }
    Ok(())
}

pub fn list_liked(ctx: &AppContext) -> Result<()> {
    let liked = ctx.interactions.snapshot().sorted_liked();
    if liked.is_empty() {
        println!("No liked items");
        return Ok(());
    }

    println!("Liked {} items:", liked.len());
    for item_id in liked {
        println!("  {}", item_id);
    }
    Ok(())
}
