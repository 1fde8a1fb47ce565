pub mod haar_cascade_locator;
