// Intentionally empty; this package only carries the end-to-end smoke test.
