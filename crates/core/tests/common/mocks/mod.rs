//! Mock collaborators injected into caches under test.
