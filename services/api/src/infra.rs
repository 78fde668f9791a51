use medicost::questionnaire::{RepositoryError, Session, SessionId, SessionRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, Session>>>,
}

impl InMemorySessionRepository {
    fn sessions(&self) -> Result<MutexGuard<'_, HashMap<SessionId, Session>>, RepositoryError> {
        self.sessions
            .lock()
            .map_err(|_| RepositoryError::Unavailable("session store poisoned".to_string()))
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions().map(|guard| guard.len()).unwrap_or(0)
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn insert(&self, session: Session) -> Result<Session, RepositoryError> {
        let mut guard = self.sessions()?;
        if guard.contains_key(&session.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: Session) -> Result<(), RepositoryError> {
        let mut guard = self.sessions()?;
        if guard.contains_key(&session.id) {
            guard.insert(session.id.clone(), session);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let guard = self.sessions()?;
        Ok(guard.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medicost::questionnaire::BackNavigation;

    fn session(id: &str) -> Session {
        Session::new(SessionId(id.to_string()), BackNavigation::ParentTable)
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let repository = InMemorySessionRepository::default();
        repository.insert(session("session-000001")).expect("first insert");
        assert!(matches!(
            repository.insert(session("session-000001")),
            Err(RepositoryError::Conflict)
        ));
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn update_requires_existing_session() {
        let repository = InMemorySessionRepository::default();
        assert!(matches!(
            repository.update(session("session-000009")),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn poisoned_store_reports_unavailable() {
        let repository = InMemorySessionRepository::default();
        let shared = repository.sessions.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.lock().expect("lock");
            panic!("poison the store");
        })
        .join();

        assert!(matches!(
            repository.fetch(&SessionId("session-000001".to_string())),
            Err(RepositoryError::Unavailable(_))
        ));
    }
}
