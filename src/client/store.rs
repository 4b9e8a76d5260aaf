use std::marker::PhantomData;

use crate::client::api::ResourceApi;
use crate::error::{AppError, AppResult};
use crate::models::{Resource, Stored};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action<T> {
    Pending,
    Fetched(Vec<Stored<T>>),
    Created(Stored<T>),
    Updated(Stored<T>),
    Deleted(String),
    Rejected(String),
}

/// Client-side copy of one collection. The list only changes once the
/// server has answered; nothing is applied optimistically or retried.
pub struct ResourceStore<T, A> {
    api: A,
    items: Vec<Stored<T>>,
    status: Status,
    _record: PhantomData<fn() -> T>,
}

impl<T: Resource, A: ResourceApi<T>> ResourceStore<T, A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
            status: Status::Idle,
            _record: PhantomData,
        }
    }

    pub fn reduce(&mut self, action: Action<T>) {
        match action {
            Action::Pending => self.status = Status::Loading,
            Action::Fetched(items) => {
                self.items = items;
                self.status = Status::Succeeded;
            }
            Action::Created(item) => {
                self.items.push(item);
                self.status = Status::Succeeded;
            }
            Action::Updated(item) => {
                if let Some(slot) = self.items.iter_mut().find(|i| i.id == item.id) {
                    *slot = item;
                }
                self.status = Status::Succeeded;
            }
            Action::Deleted(id) => {
                self.items.retain(|i| i.id != id);
                self.status = Status::Succeeded;
            }
            Action::Rejected(error) => self.status = Status::Failed(error),
        }
    }

    pub async fn fetch_all(&mut self) -> AppResult<()> {
        self.reduce(Action::Pending);
        match self.api.fetch_all().await {
            Ok(items) => {
                self.reduce(Action::Fetched(items));
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    pub async fn create(&mut self, record: &T) -> AppResult<Stored<T>> {
        self.reduce(Action::Pending);
        match self.api.create(record).await {
            Ok(created) => {
                self.reduce(Action::Created(created.clone()));
                Ok(created)
            }
            Err(e) => self.reject(e),
        }
    }

    pub async fn update(&mut self, id: &str, record: &T) -> AppResult<Stored<T>> {
        self.reduce(Action::Pending);
        match self.api.update(id, record).await {
            Ok(updated) => {
                self.reduce(Action::Updated(updated.clone()));
                Ok(updated)
            }
            Err(e) => self.reject(e),
        }
    }

    pub async fn delete(&mut self, id: &str) -> AppResult<()> {
        self.reduce(Action::Pending);
        match self.api.delete(id).await {
            Ok(removed) => {
                self.reduce(Action::Deleted(removed));
                Ok(())
            }
            Err(e) => self.reject(e),
        }
    }

    fn reject<R>(&mut self, e: AppError) -> AppResult<R> {
        log::warn!("{} request failed: {e}", T::LABEL);
        self.reduce(Action::Rejected(e.to_string()));
        Err(e)
    }

    pub fn items(&self) -> &[Stored<T>] {
        &self.items
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Status::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn find(&self, id: &str) -> Option<&Stored<T>> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn api(&self) -> &A {
        &self.api
    }
}
