use crate::app::Result;
use crate::domain::{Item, ItemAction, ViewKind};
use crate::sync::{Confirmed, MemorySurface, RefreshOutcome, Rendered, ViewController};

pub async fn sync(controller: &mut ViewController) -> Result<()> {
    let view = controller.active_view();
    let mut surface = MemorySurface::new();

    match controller.switch_to(view, &mut surface).await? {
        RefreshOutcome::Applied(count) => {
            println!("Synchronized {}: {} items", view.title(), count);
        }
        RefreshOutcome::Superseded => {
            println!("{} was refreshed by another request", view.title());
        }
    }

    Ok(())
}

pub async fn list(controller: &mut ViewController, page: usize) -> Result<()> {
    let view = controller.active_view();
    let mut surface = MemorySurface::new();

    if controller.render(&mut surface)? == Rendered::Absent {
        println!("{} has never been synchronized, fetching...", view.title());
        controller.switch_to(view, &mut surface).await?;
    }

    let page = page.max(1);
    for _ in 1..page {
        if controller.load_more(&mut surface) == 0 {
            break;
        }
    }

    let page_size = controller.window().page_size();
    let items = page_of(&surface.items, page, page_size);

    if surface.empty {
        println!("{} is empty", view.title());
        return Ok(());
    }
    if items.is_empty() {
        println!("No page {} in {}", page, view.title());
        return Ok(());
    }

    let count = surface.count.unwrap_or(surface.items.len());
    let pages = count.div_ceil(page_size);
    println!("{} ({} items), page {}/{}", view.title(), count, page, pages);
    for item in items {
        println!("{}", item_line(item));
    }

    Ok(())
}

pub async fn read(controller: &mut ViewController, id: &str) -> Result<()> {
    let action = ItemAction::read_toggle(controller.active_view());
    apply(controller, id, action).await
}

pub async fn apply(controller: &mut ViewController, id: &str, action: ItemAction) -> Result<()> {
    let mut surface = MemorySurface::new();
    let confirmed = controller.perform(id, action, &mut surface).await?;

    match confirmed {
        Confirmed::Removed {
            view,
            removal: Some(removal),
            ..
        } => {
            println!("Done: {} items left in {}", removal.count, view.title());
        }
        Confirmed::Updated {
            item: Some(item), ..
        } => {
            println!("Done: {}", item_line(&item));
        }
        Confirmed::Unchanged { view, .. } => {
            println!("Done: item stays in {}", view.title());
        }
        _ => {
            println!("Done (item {} is not cached locally)", id);
        }
    }

    Ok(())
}

pub async fn add(controller: &mut ViewController, url: &str, tags: &str) -> Result<()> {
    let mut surface = MemorySurface::new();
    let created = controller.create(url, tags, &mut surface).await?;

    println!("Saved: {}", item_line(&created.item));
    match created.count {
        Some(count) => println!("{} now holds {} items", ViewKind::List.title(), count),
        None => println!("Run `linkshelf sync` to load the rest of My List"),
    }

    Ok(())
}

pub fn logout(controller: &mut ViewController) -> Result<()> {
    let mut surface = MemorySurface::new();
    controller.logout(&mut surface)?;
    println!("Local cache cleared");
    Ok(())
}

fn page_of(items: &[Item], page: usize, page_size: usize) -> &[Item] {
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

fn item_line(item: &Item) -> String {
    let marker = if item.favorited { "★" } else { " " };
    let mut line = format!(
        "{} {:>10} {} {}",
        marker,
        item.id,
        item.added_at.format("%Y-%m-%d"),
        item.display_title()
    );

    if let Some(domain) = item.domain() {
        line.push_str(&format!(" ({})", domain));
    }
    if !item.tags.is_empty() {
        line.push_str(&format!(" [{}]", item.tags_label()));
    }

    line
}
