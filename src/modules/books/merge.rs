use super::models::BookFields;

impl BookFields {
    /// Apply a partial update: non-empty text and non-zero rating win.
    ///
    /// `checked_out` is taken from the patch whenever it differs from the
    /// current value. A payload cannot tell "omitted" from "false", so an
    /// update that leaves out `checked_out` returns a checked-out book.
    pub fn merge(&mut self, patch: BookFields) {
        if !patch.title.is_empty() {
            self.title = patch.title;
        }
        if !patch.author.is_empty() {
            self.author = patch.author;
        }
        if !patch.publisher.is_empty() {
            self.publisher = patch.publisher;
        }
        if !patch.publish_date.is_empty() {
            self.publish_date = patch.publish_date;
        }
        if patch.rating != 0 {
            self.rating = patch.rating;
        }
        if patch.checked_out != self.checked_out {
            self.checked_out = patch.checked_out;
        }
    }
}
