pub use mediator::DefaultAsyncMediator;

use crate::features::admins::AdminState;
use crate::features::books::BookServices;

pub mod middleware;

pub type AppMediator = DefaultAsyncMediator;

pub fn build_mediator(books: BookServices, admins: AdminState) -> AppMediator {
    DefaultAsyncMediator::builder()
        // Books
        .add_handler({
            let books = books.clone();
            move |cmd| {
                let books = books.clone();
                async move { crate::features::books::commands::submit::handle(books, cmd).await }
            }
        })
        .add_handler({
            let books = books.clone();
            move |cmd| {
                let books = books.clone();
                async move { crate::features::books::commands::update::handle(books, cmd).await }
            }
        })
        .add_handler({
            let books = books.clone();
            move |cmd| {
                let books = books.clone();
                async move { crate::features::books::commands::delete::handle(books, cmd).await }
            }
        })
        .add_handler({
            let books = books.clone();
            move |query| {
                let books = books.clone();
                async move { crate::features::books::queries::list::handle(books, query).await }
            }
        })
        .add_handler({
            let books = books.clone();
            move |query| {
                let books = books.clone();
                async move { crate::features::books::queries::get::handle(books, query).await }
            }
        })
        // Admins
        .add_handler({
            let admins = admins.clone();
            move |cmd| {
                let admins = admins.clone();
                async move { crate::features::admins::commands::register::handle(admins, cmd).await }
            }
        })
        .add_handler({
            let admins = admins.clone();
            move |cmd| {
                let admins = admins.clone();
                async move { crate::features::admins::commands::login::handle(admins, cmd).await }
            }
        })
        .build()
}
