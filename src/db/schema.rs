use rusqlite::Connection;

/// Initialize the database schema. Idempotent; runs at startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        -- Users (one row per login identity; role decides the dashboard)
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('admin', 'developer', 'reseller', 'customer')),
            org_id TEXT REFERENCES organizations(id) ON DELETE CASCADE,
            reseller_id TEXT REFERENCES resellers(id) ON DELETE CASCADE,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        CREATE INDEX IF NOT EXISTS idx_users_org ON users(org_id);

        -- API keys (bearer credential, stored hashed)
        CREATE TABLE IF NOT EXISTS api_keys (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            key_prefix TEXT NOT NULL,
            key_hash TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            last_used_at INTEGER,
            revoked_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_api_keys_user ON api_keys(user_id);
        CREATE INDEX IF NOT EXISTS idx_api_keys_hash ON api_keys(key_hash);

        -- Organizations (root tenant entity)
        CREATE TABLE IF NOT EXISTS organizations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            owner_email TEXT NOT NULL,
            plan TEXT NOT NULL CHECK (plan IN ('free', 'pro', 'enterprise')),
            status TEXT NOT NULL CHECK (status IN ('active', 'suspended')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        -- Products (sellable units, org-scoped)
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT,
            price_cents INTEGER NOT NULL DEFAULT 0,
            key_prefix TEXT NOT NULL DEFAULT 'KM',
            license_duration_days INTEGER,
            max_activations INTEGER NOT NULL DEFAULT 1,
            status TEXT NOT NULL CHECK (status IN ('active', 'archived')),
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_products_org ON products(org_id);

        -- Customers (org-scoped address book)
        CREATE TABLE IF NOT EXISTS customers (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            UNIQUE(org_id, email)
        );
        CREATE INDEX IF NOT EXISTS idx_customers_org ON customers(org_id);
        CREATE INDEX IF NOT EXISTS idx_customers_email ON customers(email);

        -- Licenses (the issued keys)
        CREATE TABLE IF NOT EXISTS licenses (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
            product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            customer_id TEXT REFERENCES customers(id) ON DELETE SET NULL,
            license_key TEXT NOT NULL UNIQUE,
            status TEXT NOT NULL CHECK (status IN ('available', 'active', 'inactive', 'expired', 'revoked', 'sold')),
            license_type TEXT NOT NULL CHECK (license_type IN ('single', 'floating', 'concurrent', 'standard')),
            max_activations INTEGER NOT NULL DEFAULT 1,
            current_activations INTEGER NOT NULL DEFAULT 0,
            expires_at INTEGER,
            price_cents INTEGER NOT NULL DEFAULT 0,
            duration_days INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_licenses_org ON licenses(org_id);
        CREATE INDEX IF NOT EXISTS idx_licenses_product ON licenses(product_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_licenses_key ON licenses(license_key);

        -- Resellers (shops selling an org's products)
        CREATE TABLE IF NOT EXISTS resellers (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
            shop_name TEXT NOT NULL,
            balance_cents INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_resellers_org ON resellers(org_id);

        -- Inventory lines (a reseller's stock of one product)
        -- keys_pool is a JSON array of unsold key strings, drawn FIFO on sale
        CREATE TABLE IF NOT EXISTS inventory_lines (
            id TEXT PRIMARY KEY,
            reseller_id TEXT NOT NULL REFERENCES resellers(id) ON DELETE CASCADE,
            product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            purchase_price_cents INTEGER NOT NULL DEFAULT 0,
            resale_price_cents INTEGER NOT NULL DEFAULT 0,
            quantity_available INTEGER NOT NULL DEFAULT 0,
            quantity_sold INTEGER NOT NULL DEFAULT 0,
            keys_pool TEXT NOT NULL DEFAULT '[]',
            license_duration_days INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            UNIQUE(reseller_id, product_id)
        );
        CREATE INDEX IF NOT EXISTS idx_inventory_reseller ON inventory_lines(reseller_id);

        -- Sale transactions (license_keys is a JSON array of the keys sold)
        CREATE TABLE IF NOT EXISTS sale_transactions (
            id TEXT PRIMARY KEY,
            reseller_id TEXT NOT NULL REFERENCES resellers(id) ON DELETE CASCADE,
            product_id TEXT NOT NULL REFERENCES products(id) ON DELETE CASCADE,
            customer_name TEXT NOT NULL,
            customer_email TEXT NOT NULL,
            license_keys TEXT NOT NULL DEFAULT '[]',
            quantity INTEGER NOT NULL,
            amount_cents INTEGER NOT NULL,
            transaction_type TEXT NOT NULL CHECK (transaction_type IN ('sale', 'refund')),
            status TEXT NOT NULL CHECK (status IN ('completed', 'pending')),
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_sales_reseller ON sale_transactions(reseller_id);

        -- Activations (end-user program usage of a key)
        CREATE TABLE IF NOT EXISTS activations (
            id TEXT PRIMARY KEY,
            org_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
            license_key TEXT NOT NULL,
            email TEXT NOT NULL,
            program_name TEXT NOT NULL,
            status TEXT NOT NULL CHECK (status IN ('active', 'inactive')),
            activated_at INTEGER NOT NULL,
            last_seen_at INTEGER
        );
        CREATE INDEX IF NOT EXISTS idx_activations_org ON activations(org_id);
        CREATE INDEX IF NOT EXISTS idx_activations_key ON activations(license_key);
        CREATE INDEX IF NOT EXISTS idx_activations_email ON activations(email);
        "#,
    )
}
